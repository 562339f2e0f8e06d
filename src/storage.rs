//! Local filesystem store for uploaded product images.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use actix_multipart::form::tempfile::TempFile;

use crate::domain::product_image::ImageFormat;
use crate::domain::types::{ImagePath, PRODUCT_IMAGES_DIR};

const MAX_STEM_LEN: usize = 100;
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Stores files under `<public_dir>/images/products`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    public_dir: PathBuf,
}

impl ImageStore {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn products_dir(&self) -> PathBuf {
        self.public_dir.join(PRODUCT_IMAGES_DIR)
    }

    /// Creates the products directory (and parents) if it does not exist yet.
    pub fn ensure_products_dir(&self) -> io::Result<PathBuf> {
        let dir = self.products_dir();
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder.create(&dir)?;
        Ok(dir)
    }

    /// Moves an upload into the products directory under `path`'s file name.
    ///
    /// An existing file is never replaced: when the name is taken a `-<n>`
    /// suffix is added to the stem. Returns the path the file was stored
    /// under, which belongs to this upload alone.
    pub fn store(&self, upload: TempFile, path: &ImagePath) -> io::Result<ImagePath> {
        let dir = self.ensure_products_dir()?;
        let mut file = upload.file;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = numbered(path, attempt)?;
            let destination = dir.join(candidate.file_name());
            match file.persist_noclobber(&destination) {
                Ok(_) => {
                    set_public_permissions(&destination)?;
                    return Ok(candidate);
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => file = e.file,
                // Rename fails across filesystems; fall back to a copy.
                Err(e) => {
                    file = e.file;
                    match copy_new(file.path(), &destination) {
                        Ok(()) => {
                            set_public_permissions(&destination)?;
                            return Ok(candidate);
                        }
                        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name for {path}"),
        ))
    }

    /// Removes a stored file. A file that is already gone is not an error.
    pub fn remove(&self, path: &ImagePath) -> io::Result<()> {
        match fs::remove_file(self.products_dir().join(path.file_name())) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// `name.ext` for the first attempt, `name-<n>.ext` after that.
fn numbered(path: &ImagePath, attempt: u32) -> io::Result<ImagePath> {
    if attempt == 0 {
        return Ok(path.clone());
    }
    let file_name = path.file_name();
    let numbered = match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{attempt}.{ext}"),
        None => format!("{file_name}-{attempt}"),
    };
    ImagePath::for_file_name(&numbered)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
}

fn copy_new(source: &Path, destination: &Path) -> io::Result<()> {
    let mut target = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;
    let copied = fs::File::open(source).and_then(|mut source| io::copy(&mut source, &mut target));
    if let Err(e) = copied {
        drop(target);
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}

/// Temp files are created owner-only; stored images must be world-readable.
fn set_public_permissions(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Splits the last path segment of a client file name into stem and
/// extension. A leading dot does not start an extension.
fn split_client_name(original: &str) -> (&str, Option<&str>) {
    let last = original.rsplit(['/', '\\']).next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.trim_start_matches('.').is_empty() => (stem, Some(ext)),
        _ => (last, None),
    }
}

/// Reduces a client supplied file name to a safe file stem.
///
/// Only the last path segment is kept and its extension is dropped.
/// Characters outside `[A-Za-z0-9_-]` become `_` and the result is capped in
/// length. Returns `None` when nothing usable remains.
pub fn sanitize_stem(original: &str) -> Option<String> {
    let (stem, _) = split_client_name(original);
    let cleaned = stem
        .trim_start_matches('.')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect::<String>();
    if cleaned.chars().all(|c| c == '_') {
        None
    } else {
        Some(cleaned)
    }
}

/// Name under which an upload is stored: `<timestamp>_<stem>.<ext>`.
///
/// The extension always matches the detected format: the client's own is kept
/// only when it is a spelling of that format, otherwise the canonical one is
/// used. The static file server then picks a content type matching the bytes
/// that were validated.
pub fn stored_file_name(timestamp: i64, original: &str, format: ImageFormat) -> String {
    let stem = sanitize_stem(original).unwrap_or_else(|| "image".to_string());
    let ext = split_client_name(original)
        .1
        .filter(|ext| format.matches_extension(ext))
        .unwrap_or(format.extension());
    format!("{timestamp}_{stem}.{ext}")
}
