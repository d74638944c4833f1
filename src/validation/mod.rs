//! Advisory pre-submission checks. Nothing here touches storage.

pub mod exif;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mime::Mime;
use serde::Serialize;

pub use self::exif::{CaptureTimeExtractor, ExifCaptureTime};

/// Default upload ceiling: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
    pub captured_at: Option<DateTime<Utc>>,
}

impl ValidationResult {
    fn ok(message: impl Into<String>, captured_at: Option<DateTime<Utc>>) -> Self {
        Self {
            is_valid: true,
            message: message.into(),
            captured_at,
        }
    }

    fn rejected(message: impl Into<String>, captured_at: Option<DateTime<Utc>>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            captured_at,
        }
    }
}

/// A photo as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct PhotoUpload<'a> {
    pub content_type: Option<&'a str>,
    pub filename: Option<&'a str>,
    pub bytes: &'a [u8],
}

#[derive(Clone)]
pub struct PhotoValidator {
    max_bytes: usize,
    extractor: Arc<dyn CaptureTimeExtractor>,
}

impl PhotoValidator {
    pub fn new(max_bytes: usize, extractor: Arc<dyn CaptureTimeExtractor>) -> Self {
        Self {
            max_bytes,
            extractor,
        }
    }

    /// Reject non-images and files over the size ceiling.
    pub fn validate_file(
        &self,
        content_type: Option<&str>,
        filename: Option<&str>,
        size: usize,
    ) -> ValidationResult {
        match detect_mime(content_type, filename) {
            Some(m) if m.type_() == mime::IMAGE => {}
            _ => return ValidationResult::rejected("File must be an image", None),
        }

        if size > self.max_bytes {
            return ValidationResult::rejected(
                format!("File must be smaller than {}", human_size(self.max_bytes)),
                None,
            );
        }

        ValidationResult::ok("File is a valid image", None)
    }

    /// Check the embedded capture time against the contest window. Photos
    /// without a readable capture time pass.
    pub fn validate_capture_window(
        &self,
        bytes: &[u8],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ValidationResult {
        let Some(taken) = self.extractor.capture_time(bytes) else {
            return ValidationResult::ok("Capture date unavailable; photo accepted", None);
        };

        if taken < start || taken > end {
            return ValidationResult::rejected(
                format!(
                    "Photo was taken on {}, outside the contest period ({} to {})",
                    taken.format("%Y-%m-%d"),
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d"),
                ),
                Some(taken),
            );
        }

        ValidationResult::ok("Photo was taken during the contest period", Some(taken))
    }

    /// File checks first, then the capture window.
    pub fn validate(
        &self,
        upload: PhotoUpload<'_>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ValidationResult {
        let file = self.validate_file(upload.content_type, upload.filename, upload.bytes.len());
        if !file.is_valid {
            return file;
        }
        self.validate_capture_window(upload.bytes, start, end)
    }
}

impl Default for PhotoValidator {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES, Arc::new(ExifCaptureTime))
    }
}

/// Declared content type, or a guess from the file name when the declared
/// type is missing or generic.
fn detect_mime(content_type: Option<&str>, filename: Option<&str>) -> Option<Mime> {
    let declared = content_type
        .and_then(|ct| ct.parse::<Mime>().ok())
        .filter(|m| *m != mime::APPLICATION_OCTET_STREAM);

    declared.or_else(|| filename.and_then(|name| mime_guess::from_path(name).first()))
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{}MB", bytes / (1024 * 1024))
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_falls_back_to_filename() {
        assert_eq!(
            detect_mime(None, Some("sunset.JPG")).map(|m| m.type_() == mime::IMAGE),
            Some(true)
        );
        assert_eq!(
            detect_mime(Some("application/octet-stream"), Some("a.png")),
            Some(mime::IMAGE_PNG)
        );
        assert_eq!(detect_mime(None, None), None);
    }

    #[test]
    fn human_size_prints_whole_mebibytes() {
        assert_eq!(human_size(MAX_UPLOAD_BYTES), "10MB");
        assert_eq!(human_size(1000), "1000 bytes");
    }
}
