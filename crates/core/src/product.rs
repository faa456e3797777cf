//! Products derived from object-storage image keys.
//!
//! Every photograph in the bucket is a product. Its key doubles as the
//! product id, and the display title is derived from the file name.

use serde::Serialize;

use crate::types::ProductKey;

/// Image shown when no public image host is configured.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-image.svg";

const UNTITLED: &str = "Untitled";

/// A photograph offered as a print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductKey,
    pub title: String,
    pub image_url: String,
}

impl Product {
    /// Build a product from its image key.
    ///
    /// ```
    /// use print_shop_core::product::Product;
    ///
    /// let p = Product::from_key("prints/Sea_Cliff_03.jpg", Some("https://img.example.com/"));
    /// assert_eq!(p.title, "Sea Cliff");
    /// assert_eq!(p.image_url, "https://img.example.com/prints/Sea_Cliff_03.jpg");
    /// ```
    #[must_use]
    pub fn from_key(key: &str, image_base: Option<&str>) -> Self {
        let file_name = key.rsplit('/').next().unwrap_or_default();
        Self {
            id: ProductKey::new(key),
            title: format_title(file_name),
            image_url: public_image_url(image_base, key),
        }
    }
}

/// Turn a file name into a display title.
///
/// Drops the extension, turns underscores into spaces, strips a trailing
/// sequence number, and trims. Falls back to `Untitled`.
#[must_use]
pub fn format_title(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => file_name.get(..dot).unwrap_or(file_name),
        _ => file_name,
    };
    let spaced = stem.replace('_', " ");
    let title = spaced.trim_end_matches(|c: char| c.is_ascii_digit()).trim();

    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

/// Public URL of an image key.
///
/// Absolute `http(s)` keys pass through unchanged. Without a configured base
/// the placeholder image is used.
#[must_use]
pub fn public_image_url(base: Option<&str>, key: &str) -> String {
    if key.starts_with("http://") || key.starts_with("https://") {
        return key.to_string();
    }

    match base {
        Some(base) if !base.is_empty() => {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                key.trim_start_matches('/')
            )
        }
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_title() {
        assert_eq!(format_title("Golden_Hour_12.jpg"), "Golden Hour");
        assert_eq!(format_title("dune.jpeg"), "dune");
        assert_eq!(format_title("no_extension"), "no extension");
        assert_eq!(format_title("Coast.v2.tif"), "Coast.v");
    }

    #[test]
    fn test_format_title_falls_back() {
        assert_eq!(format_title("0042.jpg"), "Untitled");
        assert_eq!(format_title(""), "Untitled");
    }

    #[test]
    fn test_public_image_url() {
        assert_eq!(
            public_image_url(Some("https://cdn.example.com"), "/prints/a.jpg"),
            "https://cdn.example.com/prints/a.jpg"
        );
        assert_eq!(
            public_image_url(Some("https://cdn.example.com/"), "prints/a.jpg"),
            "https://cdn.example.com/prints/a.jpg"
        );
        assert_eq!(
            public_image_url(None, "https://elsewhere.example.com/a.jpg"),
            "https://elsewhere.example.com/a.jpg"
        );
        assert_eq!(public_image_url(None, "prints/a.jpg"), PLACEHOLDER_IMAGE);
        assert_eq!(public_image_url(Some(""), "prints/a.jpg"), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_from_key_nested() {
        let product = Product::from_key("prints/coast/Cliff_01.jpg", None);
        assert_eq!(product.id.as_str(), "prints/coast/Cliff_01.jpg");
        assert_eq!(product.title, "Cliff");
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE);
    }
}
