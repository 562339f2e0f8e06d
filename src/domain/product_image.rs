use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ImagePath, ProductId, ProductImageId};

/// A stored image file belonging to one product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    /// Path relative to the public web root.
    pub file_path: ImagePath,
    pub is_primary: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to record a new [`ProductImage`].
///
/// There is no `is_primary` here: the repository decides it when the row is
/// committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductImage {
    pub product_id: ProductId,
    pub file_path: ImagePath,
}

/// Image container formats recognised from file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Svg,
}

impl ImageFormat {
    /// Number of leading bytes [`Self::sniff`] looks at.
    pub const SNIFF_LEN: usize = 512;

    /// Detects the format from the leading bytes of a file.
    pub fn sniff(head: &[u8]) -> Option<Self> {
        if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if head.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(Self::Png);
        }
        if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }
        if head.len() >= 14 && head.starts_with(b"BM") {
            return Some(Self::Bmp);
        }
        if looks_like_svg(head) {
            return Some(Self::Svg);
        }
        None
    }

    /// Whether a file name extension denotes this format.
    pub fn matches_extension(self, ext: &str) -> bool {
        let known: &[&str] = match self {
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
            Self::Gif => &["gif"],
            Self::Bmp => &["bmp"],
            Self::Webp => &["webp"],
            Self::Svg => &["svg"],
        };
        known.iter().any(|known| known.eq_ignore_ascii_case(ext))
    }

    /// Canonical file extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }
}

/// The root element must be `<svg`. Only an XML declaration, processing
/// instructions, comments and a doctype may precede it.
fn looks_like_svg(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head);
    let mut rest = text.trim_start_matches('\u{feff}');

    loop {
        rest = rest.trim_start();
        let skipped = if let Some(after) = rest.strip_prefix("<?") {
            after.find("?>").map(|end| &after[end + 2..])
        } else if let Some(after) = rest.strip_prefix("<!--") {
            after.find("-->").map(|end| &after[end + 3..])
        } else if rest
            .get(..9)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("<!doctype"))
        {
            rest.find('>').map(|end| &rest[end + 1..])
        } else {
            break;
        };
        match skipped {
            Some(next) => rest = next,
            None => return false,
        }
    }

    rest.get(..4)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("<svg"))
        && rest[4..].starts_with(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
}
