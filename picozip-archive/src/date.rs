//! MS-DOS date/time representation used by ZIP headers.
//!
//! ZIP stores modification times as two packed 16-bit words with 2-second
//! resolution and a 1980-based year. The representable range is
//! 1980-01-01 00:00:00 through 2107-12-31 23:59:58.

use std::time::SystemTime;

use picozip_core::{PicoZipError, Result};

/// A calendar timestamp restricted to what DOS date/time can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DosDateTime {
    /// Build a timestamp from calendar components, validating each range.
    ///
    /// Years 1980-2107, real month/day bounds (leap years included),
    /// hour 0-23, minute 0-59, second 0-59. Seconds lose their low bit when
    /// packed.
    pub fn from_date_and_time(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self> {
        if !(1980..=2107).contains(&year) {
            return Err(PicoZipError::invalid_timestamp(format!("year {year}")));
        }
        if !(1..=12).contains(&month) {
            return Err(PicoZipError::invalid_timestamp(format!("month {month}")));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(PicoZipError::invalid_timestamp(format!(
                "day {day} of {year}-{month:02}"
            )));
        }
        if hour > 23 {
            return Err(PicoZipError::invalid_timestamp(format!("hour {hour}")));
        }
        if minute > 59 {
            return Err(PicoZipError::invalid_timestamp(format!("minute {minute}")));
        }
        if second > 59 {
            return Err(PicoZipError::invalid_timestamp(format!("second {second}")));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// The packed 32-bit form: date word in the high half, time word in the
    /// low half.
    pub fn packed(&self) -> u32 {
        let date = u32::from(self.day)
            | (u32::from(self.month) << 5)
            | (u32::from(self.year - 1980) << 9);
        let time = u32::from(self.second >> 1)
            | (u32::from(self.minute) << 5)
            | (u32::from(self.hour) << 11);
        (date << 16) | time
    }

    /// Year (1980-2107).
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Month (1-12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day of month (1-31).
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Hour (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Second (0-59, stored with 2-second resolution).
    pub fn second(&self) -> u8 {
        self.second
    }

    /// The current system time, or the DOS epoch if out of range.
    pub fn now() -> Self {
        Self::try_from(SystemTime::now()).unwrap_or_default()
    }
}

impl Default for DosDateTime {
    /// The DOS epoch, 1980-01-01 00:00:00.
    fn default() -> Self {
        Self {
            year: 1980,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl TryFrom<SystemTime> for DosDateTime {
    type Error = PicoZipError;

    fn try_from(value: SystemTime) -> Result<Self> {
        let secs = value
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| PicoZipError::invalid_timestamp("before the Unix epoch"))?
            .as_secs();
        let secs = i64::try_from(secs)
            .map_err(|_| PicoZipError::invalid_timestamp("beyond the representable range"))?;
        let odt = time::OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|e| PicoZipError::invalid_timestamp(e.to_string()))?;
        let year = u16::try_from(odt.year())
            .map_err(|_| PicoZipError::invalid_timestamp(format!("year {}", odt.year())))?;
        Self::from_date_and_time(
            year,
            u8::from(odt.month()),
            odt.day(),
            odt.hour(),
            odt.minute(),
            odt.second(),
        )
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
