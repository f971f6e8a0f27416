use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MimeType(pub String);

impl MimeType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn application_octet_stream() -> Self {
        Self("application/octet-stream".into())
    }

    pub fn application_zip() -> Self {
        Self("application/zip".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the declared type is in the `image/*` family.
    pub fn is_image(&self) -> bool {
        self.0
            .split_once('/')
            .is_some_and(|(kind, sub)| kind.eq_ignore_ascii_case("image") && !sub.is_empty())
    }

    /// The part after the slash, e.g. `png` for `image/png`.
    pub fn subtype(&self) -> Option<&str> {
        self.0
            .split_once('/')
            .map(|(_, sub)| sub.split(';').next().unwrap_or(sub).trim())
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MimeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MimeType(s.to_string()))
    }
}

impl From<&str> for MimeType {
    fn from(s: &str) -> Self {
        MimeType(s.to_string())
    }
}

impl From<String> for MimeType {
    fn from(s: String) -> Self {
        MimeType(s)
    }
}
