//! Capture time from the EXIF block of TIFF-based RAW containers (NEF, CR2, ARW, DNG, ...).

use std::io::Cursor;

use chrono::NaiveDate;
use exif::{In, Tag, Value};
use tracing::debug;

/// Seconds since the epoch of `DateTimeOriginal` (falling back to `DateTime`), 0 if absent.
///
/// EXIF times carry no zone unless `OffsetTimeOriginal` is present; without it they are
/// read as UTC.
pub(crate) fn capture_timestamp(file: &[u8]) -> i64 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(file)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No EXIF capture time: {}", e);
            return 0;
        }
    };

    let Some(mut datetime) = [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
        .find_map(|field| first_ascii(&field.value))
        .and_then(|ascii| exif::DateTime::from_ascii(ascii).ok())
    else {
        return 0;
    };

    if let Some(offset) = exif
        .get_field(Tag::OffsetTimeOriginal, In::PRIMARY)
        .and_then(|field| first_ascii(&field.value))
    {
        if let Err(e) = datetime.parse_offset(offset) {
            debug!("Ignoring malformed capture time offset: {}", e);
        }
    }

    to_timestamp(&datetime).unwrap_or(0)
}

fn first_ascii(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Ascii(strings) => strings.first().map(Vec::as_slice),
        _ => None,
    }
}

fn to_timestamp(datetime: &exif::DateTime) -> Option<i64> {
    let local = NaiveDate::from_ymd_opt(
        i32::from(datetime.year),
        u32::from(datetime.month),
        u32::from(datetime.day),
    )?
    .and_hms_opt(
        u32::from(datetime.hour),
        u32::from(datetime.minute),
        u32::from(datetime.second),
    )?;

    let offset_seconds = i64::from(datetime.offset.unwrap_or(0)) * 60;
    Some(local.and_utc().timestamp() - offset_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(ascii: &[u8]) -> exif::DateTime {
        exif::DateTime::from_ascii(ascii).unwrap()
    }

    #[test]
    fn test_utc_capture_time() {
        assert_eq!(to_timestamp(&datetime(b"2023:11:14 22:13:20")), Some(1_700_000_000));
    }

    #[test]
    fn test_offset_is_applied() {
        let mut dt = datetime(b"2023:11:15 00:13:20");
        dt.parse_offset(b"+02:00").unwrap();
        assert_eq!(to_timestamp(&dt), Some(1_700_000_000));
    }

    #[test]
    fn test_blank_date_has_no_timestamp() {
        // Cameras without a clock write zeros
        let blank = exif::DateTime::from_ascii(b"0000:00:00 00:00:00").ok();
        assert_eq!(blank.and_then(|dt| to_timestamp(&dt)), None);
    }

    #[test]
    fn test_non_exif_data() {
        assert_eq!(capture_timestamp(b"not a raw file"), 0);
        assert_eq!(capture_timestamp(&[]), 0);
    }
}
