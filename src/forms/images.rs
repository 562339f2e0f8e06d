use std::fs::File;
use std::io::Read;

use actix_multipart::MultipartError;
use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use actix_web::error::PayloadError;

use crate::domain::product_image::ImageFormat;
use crate::forms::FieldErrors;

/// Multipart field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

/// Formats accepted for product images. BMP is an image but not accepted.
pub const ALLOWED_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::Svg,
    ImageFormat::Webp,
];

const ALLOWED_TYPES_LABEL: &str = "jpeg, png, jpg, gif, svg, webp";

const REQUIRED_MESSAGE: &str = "The image field is required.";

fn max_message(max_upload_kb: u64) -> String {
    format!("The image field must not be greater than {max_upload_kb} kilobytes.")
}

/// Upload form posted by the admin product page.
///
/// The per-field limit sits above the configured image limit so most
/// oversized files reach validation. Bodies over it are mapped to the same
/// `max` error by [`UploadImageForm::rejection_errors`].
#[derive(MultipartForm)]
pub struct UploadImageForm {
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
}

/// A validated upload ready to be stored.
#[derive(Debug)]
pub struct UploadImagePayload {
    pub file: TempFile,
    /// File name as sent by the client, unsanitized.
    pub original_name: String,
    pub format: ImageFormat,
}

fn is_present(file: &TempFile) -> bool {
    file.size > 0 || file.file_name.as_deref().is_some_and(|name| !name.is_empty())
}

fn sniff(file: &TempFile) -> std::io::Result<Option<ImageFormat>> {
    let mut head = Vec::with_capacity(ImageFormat::SNIFF_LEN);
    File::open(file.file.path())?
        .take(ImageFormat::SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(ImageFormat::sniff(&head))
}

impl UploadImageForm {
    /// Applies the `required`, `image`, `mimes` and `max` rules to the
    /// `image` field. All failing rules are reported, except that a missing
    /// file stops validation.
    pub fn into_payload(self, max_upload_kb: u64) -> Result<UploadImagePayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        let Some(file) = self.image.filter(is_present) else {
            errors.add(IMAGE_FIELD, REQUIRED_MESSAGE);
            return Err(errors);
        };

        let format = match sniff(&file) {
            Ok(format) => format,
            Err(e) => {
                log::error!("Failed to read uploaded image: {e}");
                errors.add(IMAGE_FIELD, "The image failed to upload.");
                return Err(errors);
            }
        };

        if format.is_none() {
            errors.add(IMAGE_FIELD, "The image field must be an image.");
        }
        if !format.is_some_and(|f| ALLOWED_FORMATS.contains(&f)) {
            errors.add(
                IMAGE_FIELD,
                format!("The image field must be a file of type: {ALLOWED_TYPES_LABEL}."),
            );
        }
        if file.size as u64 > max_upload_kb.saturating_mul(1024) {
            errors.add(IMAGE_FIELD, max_message(max_upload_kb));
        }

        match format {
            Some(format) if errors.is_empty() => Ok(UploadImagePayload {
                original_name: file.file_name.clone().unwrap_or_default(),
                format,
                file,
            }),
            _ => Err(errors),
        }
    }

    /// Field errors for a request body that could not be read as an upload
    /// form. A body over the multipart size limit fails the `max` rule; a
    /// missing or malformed multipart body means no file was sent.
    pub fn rejection_errors(err: &actix_web::Error, max_upload_kb: u64) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match err.as_error::<MultipartError>() {
            Some(MultipartError::Payload(PayloadError::Overflow)) => {
                errors.add(IMAGE_FIELD, max_message(max_upload_kb));
            }
            _ => {
                log::debug!("Unreadable upload body: {err}");
                errors.add(IMAGE_FIELD, REQUIRED_MESSAGE);
            }
        }
        errors
    }
}
