//! Hand-built `multipart/form-data` bodies.
//!
//! The body is encoded here rather than by the HTTP client so that the
//! boundary in the `Content-Type` header and the boundary in the bytes are
//! guaranteed to be the same token.

use std::fmt;
use uuid::Uuid;
use vaultpost_core::{Error, Result};

/// Recognizable prefix of generated boundaries
pub const BOUNDARY_PREFIX: &str = "----VaultpostBoundary";

/// RFC 2046 limit on boundary length
const MAX_BOUNDARY_LEN: usize = 70;

/// Boundary token separating parts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Fresh boundary: fixed prefix plus 32 random alphanumeric characters.
    pub fn generate() -> Self {
        Self(format!("{}{}", BOUNDARY_PREFIX, Uuid::new_v4().simple()))
    }

    /// Caller-supplied boundary.
    ///
    /// Only characters that need no quoting in a `Content-Type` parameter are
    /// accepted (`A-Z a-z 0-9 ' + _ . -`), so the header can carry the token
    /// bare and still match the body.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() || token.len() > MAX_BOUNDARY_LEN {
            return Err(Error::validation_error(format!(
                "Boundary must be 1-{} characters, got {}",
                MAX_BOUNDARY_LEN,
                token.len()
            )));
        }
        if let Some(bad) = token
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || "'+_.-".contains(*c)))
        {
            return Err(Error::validation_error(format!(
                "Boundary contains invalid character {:?}",
                bad
            )));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One form field
#[derive(Clone, PartialEq, Eq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }

    fn content(&self) -> &[u8] {
        match self {
            Self::Text { value, .. } => value.as_bytes(),
            Self::File { bytes, .. } => bytes,
        }
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::File {
                name,
                filename,
                content_type,
                bytes,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("filename", filename)
                .field("content_type", content_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// An encoded body and the boundary it was built with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    boundary: Boundary,
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Encode `parts` in the given order.
///
/// Pure: the same parts and boundary always produce the same bytes.
///
/// ```
/// use vaultpost_client::multipart::{encode, Boundary, Part};
///
/// let body = encode(&[Part::text("type", "composer")], Boundary::new("XYZ").unwrap());
/// assert_eq!(
///     body.bytes(),
///     b"--XYZ\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\ncomposer\r\n--XYZ--\r\n"
/// );
/// ```
pub fn encode(parts: &[Part], boundary: Boundary) -> MultipartBody {
    let capacity: usize = parts
        .iter()
        .map(|p| p.content().len() + 128 + boundary.as_str().len())
        .sum();
    let mut bytes = Vec::with_capacity(capacity + boundary.as_str().len() + 8);

    for part in parts {
        bytes.extend_from_slice(b"--");
        bytes.extend_from_slice(boundary.as_str().as_bytes());
        bytes.extend_from_slice(b"\r\n");

        match part {
            Part::Text { name, .. } => {
                bytes.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n",
                        escape_quoted(name)
                    )
                    .as_bytes(),
                );
            }
            Part::File {
                name,
                filename,
                content_type,
                ..
            } => {
                bytes.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        escape_quoted(name),
                        escape_quoted(filename)
                    )
                    .as_bytes(),
                );
                bytes.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
        }

        bytes.extend_from_slice(b"\r\n");
        bytes.extend_from_slice(part.content());
        bytes.extend_from_slice(b"\r\n");
    }

    bytes.extend_from_slice(b"--");
    bytes.extend_from_slice(boundary.as_str().as_bytes());
    bytes.extend_from_slice(b"--\r\n");

    MultipartBody { boundary, bytes }
}

/// Encode with a freshly generated boundary that does not occur in any part.
pub fn encode_with_fresh_boundary(parts: &[Part]) -> MultipartBody {
    loop {
        let boundary = Boundary::generate();
        if !parts
            .iter()
            .any(|p| contains(p.content(), boundary.as_str().as_bytes()))
        {
            return encode(parts, boundary);
        }
        log::debug!("Boundary {} collided with part content, regenerating", boundary);
    }
}

/// Quoted-string escaping used by browsers for form-data names
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
