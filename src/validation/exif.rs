use std::io::Cursor;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use exif::{In, Reader, Tag, Value};

/// Source of the moment a photo was taken.
pub trait CaptureTimeExtractor: Send + Sync {
    /// `None` when the image carries no usable capture time.
    fn capture_time(&self, bytes: &[u8]) -> Option<DateTime<Utc>>;
}

/// Reads `DateTimeOriginal` (falling back to `DateTime`) from embedded EXIF
/// data. Times without an `OffsetTimeOriginal` are taken as UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifCaptureTime;

impl CaptureTimeExtractor for ExifCaptureTime {
    fn capture_time(&self, bytes: &[u8]) -> Option<DateTime<Utc>> {
        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(e) => {
                tracing::debug!(error = %e, "No readable EXIF data");
                return None;
            }
        };

        let field = exif
            .get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))?;
        let raw = first_ascii(&field.value)?;
        let mut dt = exif::DateTime::from_ascii(raw).ok()?;

        if let Some(offset) = exif
            .get_field(Tag::OffsetTimeOriginal, In::PRIMARY)
            .and_then(|f| first_ascii(&f.value))
        {
            // An unparsable offset leaves the time as UTC.
            let _ = dt.parse_offset(offset);
        }

        to_utc(&dt)
    }
}

fn first_ascii(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Ascii(parts) => parts.first().map(Vec::as_slice),
        _ => None,
    }
}

fn to_utc(dt: &exif::DateTime) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?
        .and_hms_opt(u32::from(dt.hour), u32::from(dt.minute), u32::from(dt.second))?;

    match dt.offset {
        Some(minutes) => FixedOffset::east_opt(i32::from(minutes) * 60)?
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc)),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}
