use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::MimeType;

/// Requested output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    Png,
    Jpeg,
    #[default]
    Webp,
    /// Re-encode in whatever format the source was in.
    Original,
}

impl OutputFormat {
    /// Parses a format token. Unrecognized tokens resolve to WebP.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "png" => OutputFormat::Png,
            "jpg" | "jpeg" => OutputFormat::Jpeg,
            "webp" => OutputFormat::Webp,
            "original" => OutputFormat::Original,
            _ => OutputFormat::Webp,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
            OutputFormat::Original => "original",
        }
    }

    /// Content type of the encoded output, unknown until the source is inspected for `original`.
    pub fn content_type(&self) -> Option<MimeType> {
        match self {
            OutputFormat::Png => Some(MimeType::from("image/png")),
            OutputFormat::Jpeg => Some(MimeType::from("image/jpeg")),
            OutputFormat::Webp => Some(MimeType::from("image/webp")),
            OutputFormat::Original => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for OutputFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OutputFormat::from_token(s))
    }
}
