//! Module containing functionality related to BSON DateTimes.

use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

/// A BSON datetime: a signed 64-bit count of milliseconds since the Unix epoch.
///
/// Conversions to and from [`time::OffsetDateTime`] and RFC 3339 strings are
/// bounded by the range representable in that type; datetimes outside it
/// round-trip through their millisecond value instead.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DateTime(i64);

impl DateTime {
    /// The latest possible date that can be represented in BSON.
    pub const MAX: Self = Self::from_millis(i64::MAX);

    /// The earliest possible date that can be represented in BSON.
    pub const MIN: Self = Self::from_millis(i64::MIN);

    /// Makes a new [`DateTime`] from the number of non-leap milliseconds since
    /// January 1, 1970 0:00:00 UTC (aka "UNIX timestamp").
    pub const fn from_millis(date: i64) -> Self {
        Self(date)
    }

    /// Returns a [`DateTime`] which corresponds to the current date and time.
    pub fn now() -> DateTime {
        Self::from_system_time(SystemTime::now())
    }

    /// Convert the given [`SystemTime`] to a [`DateTime`], truncating to millisecond precision.
    pub fn from_system_time(st: SystemTime) -> Self {
        match st.duration_since(UNIX_EPOCH) {
            Ok(d) => {
                if d.as_millis() <= i64::MAX as u128 {
                    Self::from_millis(d.as_millis() as i64)
                } else {
                    Self::MAX
                }
            }
            // handle SystemTime from before the Unix epoch
            Err(e) => {
                let millis = e.duration().as_millis();
                if millis > i64::MAX as u128 {
                    Self::MIN
                } else {
                    Self::from_millis(-(millis as i64))
                }
            }
        }
    }

    /// Returns the number of non-leap milliseconds since January 1, 1970 UTC.
    pub const fn timestamp_millis(self) -> i64 {
        self.0
    }

    pub(crate) fn to_time_opt(self) -> Option<time::OffsetDateTime> {
        time::OffsetDateTime::UNIX_EPOCH.checked_add(time::Duration::milliseconds(self.0))
    }

    /// Convert this [`DateTime`] to an RFC 3339 formatted string.
    pub fn try_to_rfc3339_string(self) -> Result<String> {
        let odt = self.to_time_opt().ok_or_else(|| {
            Error::incompatible_type_conversion(format!(
                "BSON datetime {} out of RFC 3339 range",
                self.0
            ))
        })?;
        odt.format(&Rfc3339)
            .map_err(Error::incompatible_type_conversion)
    }

    /// Convert the given RFC 3339 formatted string to a [`DateTime`], truncating it to millisecond
    /// precision.
    pub fn parse_rfc3339_str(s: impl AsRef<str>) -> Result<Self> {
        let odt = time::OffsetDateTime::parse(s.as_ref(), &Rfc3339)
            .map_err(Error::incompatible_type_conversion)?;
        let millis = odt.unix_timestamp_nanos() / 1_000_000;
        Ok(Self::from_millis(millis as i64))
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tup = f.debug_tuple("DateTime");
        match self.try_to_rfc3339_string() {
            Ok(s) => tup.field(&s),
            _ => tup.field(&self.0),
        };
        tup.finish()
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_to_rfc3339_string() {
            Ok(s) => f.write_str(&s),
            _ => write!(f, "{} ms", self.0),
        }
    }
}

/// A BSON timestamp: the payload of the 0x11 element type.
///
/// This type is used internally by MongoDB for ordering operations; it is not
/// a general purpose wall-clock time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    /// The number of seconds since the Unix epoch.
    pub time: u32,

    /// An incrementing value to order events with the same `time`.
    pub increment: u32,
}

impl Timestamp {
    pub(crate) fn to_le_bytes(self) -> [u8; 8] {
        let packed = ((self.time as u64) << 32) | self.increment as u64;
        packed.to_le_bytes()
    }

    pub(crate) fn from_le_i64(val: i64) -> Self {
        let upper = (val.to_le() >> 32) as u32;
        let lower = (val.to_le() & 0xFFFF_FFFF) as u32;

        Timestamp {
            time: upper,
            increment: lower,
        }
    }
}
