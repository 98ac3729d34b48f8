use std::fmt;
use std::path::Path;

/// The entity type an image belongs to. Each kind has its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Region,
    Comuna,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Region, EntityKind::Comuna];

    /// Directory name under the media root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Comuna => "comuna",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// An accepted image file extension, including the leading dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageExtension {
    Png,
    Jpg,
}

impl ImageExtension {
    /// Extract an accepted extension from an uploaded file name.
    ///
    /// Only `.png` and `.jpg` (exact case) are accepted; anything else,
    /// including a name without an extension, yields `None`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?;
        Self::parse(&format!(".{ext}"))
    }

    /// Parse a stored extension string such as `".png"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ".png" => Some(Self::Png),
            ".jpg" => Some(Self::Jpg),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Jpg => ".jpg",
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
