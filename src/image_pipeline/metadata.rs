//! Capture metadata

use chrono::{DateTime, Utc};
use tracing::warn;

const CAPTURE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Capture time of a decoded RAW file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Seconds since the Unix epoch, 0 when the file records no usable capture time
    pub capture_timestamp: i64,
    /// `capture_timestamp` as a UTC date, `None` exactly when the timestamp is 0
    pub capture_date: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Timestamps no date can represent are treated as unknown.
    pub fn from_timestamp(capture_timestamp: i64) -> Self {
        if capture_timestamp == 0 {
            return Self::default();
        }

        match DateTime::from_timestamp(capture_timestamp, 0) {
            Some(date) => Self {
                capture_timestamp,
                capture_date: Some(date),
            },
            None => {
                warn!("Capture timestamp {} is out of range, ignoring it", capture_timestamp);
                Self::default()
            }
        }
    }

    /// Capture date as `YYYY-MM-DDTHH:MM:SS`
    pub fn capture_date_string(&self) -> Option<String> {
        self.capture_date
            .map(|date| date.format(CAPTURE_DATE_FORMAT).to_string())
    }
}
