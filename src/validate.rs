use bytes::Bytes;

use crate::error::ValidationError;

pub const CONTENT_FIELD: &str = "content_image";
pub const STYLE_FIELD: &str = "style_image";
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Upload limits. Built once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct UploadConstraint {
    pub allowed_extensions: &'static [&'static str],
    pub max_bytes: usize,
}

impl Default for UploadConstraint {
    fn default() -> Self {
        UploadConstraint {
            allowed_extensions: ALLOWED_EXTENSIONS,
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// One multipart file field as received off the wire, before any checks.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Both uploads, validated and ready for decoding.
#[derive(Debug)]
pub struct TransferRequest {
    pub content: Bytes,
    pub style: Bytes,
}

impl UploadConstraint {
    /// Checks are cheap byte-length and name inspections only; no pixel is
    /// decoded here.
    pub fn validate(
        &self,
        content: Option<UploadedFile>,
        style: Option<UploadedFile>,
    ) -> Result<TransferRequest, ValidationError> {
        let content = self.check_one(CONTENT_FIELD, content)?;
        let style = self.check_one(STYLE_FIELD, style)?;
        Ok(TransferRequest { content, style })
    }

    fn check_one(
        &self,
        field: &'static str,
        file: Option<UploadedFile>,
    ) -> Result<Bytes, ValidationError> {
        let file = file.ok_or(ValidationError::MissingField { field })?;
        if file.filename.trim().is_empty() {
            return Err(ValidationError::EmptySelection { field });
        }
        let extension = file
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.contains(&extension.as_str()) {
            return Err(ValidationError::UnsupportedType { field, extension });
        }
        if file.bytes.is_empty() {
            return Err(ValidationError::EmptySelection { field });
        }
        if file.bytes.len() > self.max_bytes {
            return Err(ValidationError::PayloadTooLarge {
                field,
                limit_bytes: self.max_bytes,
            });
        }
        Ok(file.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: &'static [u8]) -> Option<UploadedFile> {
        Some(UploadedFile {
            filename: name.to_string(),
            bytes: Bytes::from_static(bytes),
        })
    }

    #[test]
    fn accepts_a_well_formed_pair() {
        let constraint = UploadConstraint::default();
        let request = constraint
            .validate(file("photo.png", b"abc"), file("art.JPEG", b"def"))
            .unwrap();
        assert_eq!(request.content.as_ref(), b"abc");
        assert_eq!(request.style.as_ref(), b"def");
    }

    #[test]
    fn missing_field_is_classified() {
        let constraint = UploadConstraint::default();
        let err = constraint.validate(file("photo.png", b"abc"), None).unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: STYLE_FIELD });
    }

    #[test]
    fn blank_filename_is_an_empty_selection() {
        let constraint = UploadConstraint::default();
        let err = constraint
            .validate(file("  ", b"abc"), file("art.png", b"def"))
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptySelection { field: CONTENT_FIELD });
    }

    #[test]
    fn empty_payload_is_an_empty_selection() {
        let constraint = UploadConstraint::default();
        let err = constraint
            .validate(file("photo.png", b""), file("art.png", b"def"))
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptySelection { field: CONTENT_FIELD });
    }

    #[test]
    fn renamed_text_file_extension_is_rejected() {
        let constraint = UploadConstraint::default();
        let err = constraint
            .validate(file("photo.png", b"abc"), file("notes.txt", b"plain text"))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedType {
                field: STYLE_FIELD,
                extension: "txt".to_string(),
            }
        );
    }

    #[test]
    fn extensionless_filename_is_rejected() {
        let constraint = UploadConstraint::default();
        let err = constraint
            .validate(file("photo", b"abc"), file("art.png", b"def"))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedType { field: CONTENT_FIELD, .. }
        ));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let constraint = UploadConstraint {
            max_bytes: 2,
            ..UploadConstraint::default()
        };
        let err = constraint
            .validate(file("photo.png", b"abc"), file("art.png", b"de"))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::PayloadTooLarge {
                field: CONTENT_FIELD,
                limit_bytes: 2,
            }
        );
    }
}
