use serde::{Deserialize, Serialize};

/// A file stored server-side and referenced from page markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Backend identifier
    #[serde(deserialize_with = "super::id::deserialize")]
    pub id: String,

    /// Original file name
    #[serde(default)]
    pub name: String,

    /// MIME type
    #[serde(rename = "type", alias = "file_type", alias = "content_type", default)]
    pub file_type: String,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    /// Where the file can be fetched
    #[serde(default, alias = "file")]
    pub url: String,
}

impl Asset {
    /// True for types a browser can show inline as an image
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.file_type.starts_with("image/")
    }

    /// Human-readable size, e.g. `1.5 MB`
    #[must_use]
    pub fn display_size(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        #[allow(clippy::cast_precision_loss)]
        let mut size = self.size as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} {}", self.size, UNITS[0])
        } else {
            format!("{size:.1} {}", UNITS[unit])
        }
    }
}
