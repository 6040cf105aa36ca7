use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::{Display, Formatter};

/// Layout of the timestamp written by the mailbox process, e.g. `20240115120000`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;

/// Civil timezone the mailbox process writes its timestamps in.
pub const MAILBOX_TIMEZONE: Tz = chrono_tz::US::Central;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError {
    pub value: String,
    pub reason: TimestampErrorReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampErrorReason {
    // Not exactly fourteen ASCII digits
    BadFormat,
    // Digits that don't form a calendar date and time
    BadDate(String),
    // Skipped by a daylight saving transition
    NonExistentLocalTime,
}

/// Parse a mailbox timestamp as US Central civil time.
///
/// Times repeated by the autumn DST transition resolve to the earlier instant.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Tz>, TimestampError> {
    let error = |reason: TimestampErrorReason| TimestampError {
        value: value.to_string(),
        reason,
    };

    // chrono's %Y accepts signs and extra digits, so pin the shape first
    if value.len() != TIMESTAMP_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error(TimestampErrorReason::BadFormat));
    }

    let naive: NaiveDateTime = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|err| error(TimestampErrorReason::BadDate(err.to_string())))?;

    MAILBOX_TIMEZONE
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| error(TimestampErrorReason::NonExistentLocalTime))
}

/// Whether more than `threshold_hours` have passed between `timestamp` and `now`.
pub fn is_stale(timestamp: &DateTime<Tz>, now: DateTime<Utc>, threshold_hours: u32) -> bool {
    now.signed_duration_since(timestamp) > TimeDelta::hours(i64::from(threshold_hours))
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            TimestampErrorReason::BadFormat => {
                write!(f, "'{}' is not in {} format", self.value, TIMESTAMP_FORMAT)
            }
            TimestampErrorReason::BadDate(err) => {
                write!(f, "'{}' is not a valid date: {}", self.value, err)
            }
            TimestampErrorReason::NonExistentLocalTime => {
                write!(f, "'{}' does not exist in {}", self.value, MAILBOX_TIMEZONE)
            }
        }
    }
}

impl std::error::Error for TimestampError {}
