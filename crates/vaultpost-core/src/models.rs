//! Core data models for the publish pipeline.
//!
//! These types are designed to be:
//! - **Serializable**: reports can be printed as JSON by the CLI
//! - **Cloneable**: cheap to hand between pipeline stages
//! - **Type-Safe**: enums replace status strings

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Position in source text (line, column, byte offset)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
}

impl SourcePosition {
    /// Create a new source position
    pub fn new(line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// Create position from byte offset by computing line and column.
    ///
    /// Line numbers start at 1, column numbers start at 1.
    pub fn from_offset(content: &str, offset: usize, length: usize) -> Self {
        let before = &content[..offset.min(content.len())];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map(|pos| offset - pos)
            .unwrap_or(offset + 1);

        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// Byte range covered by this position.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// A note captured for a single publish operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Topic title (the note's file stem)
    pub name: String,
    /// Vault-relative path of the note, used as link resolution context
    pub path: PathBuf,
    /// Raw markup
    pub content: String,
}

impl Document {
    /// Create a document that lives at the vault root as `<name>.md`.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let path = PathBuf::from(format!("{}.md", name));
        Self {
            name,
            path,
            content: content.into(),
        }
    }

    /// Create a document from its vault-relative path; the title is the file stem.
    pub fn from_path(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            content: content.into(),
        }
    }

    /// Path used as context when resolving embeds found in this document.
    pub fn context_path(&self) -> &Path {
        &self.path
    }
}

/// An embedded-file reference found in note markup: `![[target]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Identifier exactly as written between `![[` and `]]`
    pub target: String,
    /// Location of the full marker, when extracted from text
    pub position: Option<SourcePosition>,
}

impl Reference {
    /// Reference without a recorded position
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            position: None,
        }
    }

    /// Reference located at `position` in its source text
    pub fn at(target: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            target: target.into(),
            position: Some(position),
        }
    }

    /// The embed marker as it appears in the note: `![[target]]`
    pub fn marker(&self) -> String {
        format!("![[{}]]", self.target)
    }

    /// The vault link path, without `|size`/alias and `#fragment` suffixes.
    pub fn link_path(&self) -> &str {
        let without_alias = self.target.split('|').next().unwrap_or_default();
        without_alias.split('#').next().unwrap_or_default().trim()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target)
    }
}

/// Binary payload resolved for one reference. Lives for one upload attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub display_name: String,
    pub mime_hint: String,
    pub byte_length: u64,
    pub bytes: Vec<u8>,
}

impl ResolvedAsset {
    pub fn new(
        display_name: impl Into<String>,
        mime_hint: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            mime_hint: mime_hint.into(),
            byte_length: bytes.len() as u64,
            bytes,
        }
    }
}

impl fmt::Debug for ResolvedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAsset")
            .field("display_name", &self.display_name)
            .field("mime_hint", &self.mime_hint)
            .field("byte_length", &self.byte_length)
            .finish_non_exhaustive()
    }
}

/// Why a single reference was not uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadFailure {
    /// The reference does not resolve to any path in the vault
    Unresolved { reason: String },
    /// The path resolved but its bytes could not be read
    Unreadable { reason: String },
    /// Network error or timeout
    Transport { reason: String },
    /// The forum answered with a non-200 status
    Rejected { status: u16, body: String },
    /// The forum answered 200 but the body did not carry an upload URL
    Parse { reason: String },
    /// The publish was cancelled before this reference finished
    Cancelled,
}

impl UploadFailure {
    /// Map a pipeline error onto the per-reference failure it represents.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::ReferenceNotFound { .. } | Error::PathTraversalAttempt { .. } => {
                Self::Unresolved {
                    reason: err.to_string(),
                }
            }
            Error::Io(_) | Error::FileNotFound { .. } | Error::FileTooLarge { .. } => {
                Self::Unreadable {
                    reason: err.to_string(),
                }
            }
            Error::RemoteRejected { status, body } => Self::Rejected {
                status: *status,
                body: body.clone(),
            },
            Error::ParseError { .. } => Self::Parse {
                reason: err.to_string(),
            },
            Error::Cancelled => Self::Cancelled,
            _ => Self::Transport {
                reason: err.to_string(),
            },
        }
    }

    /// Human-readable reason
    pub fn reason(&self) -> String {
        match self {
            Self::Unresolved { reason }
            | Self::Unreadable { reason }
            | Self::Transport { reason }
            | Self::Parse { reason } => reason.clone(),
            Self::Rejected { status, body } => format!("status {}: {}", status, body),
            Self::Cancelled => "cancelled".to_string(),
        }
    }
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

/// Outcome of one reference's upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadResult {
    Uploaded { url: String },
    Failed(UploadFailure),
}

impl UploadResult {
    pub fn uploaded(url: impl Into<String>) -> Self {
        Self::Uploaded { url: url.into() }
    }

    pub fn failed(failure: UploadFailure) -> Self {
        Self::Failed(failure)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }

    /// Server-assigned URL for successful uploads
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Uploaded { url } => Some(url),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&UploadFailure> {
        match self {
            Self::Uploaded { .. } => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

/// A forum category (top-level or subcategory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Terminal result of submitting the rewritten note as a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Topic created
    Published {
        topic_id: Option<u64>,
        post_id: Option<u64>,
    },
    /// The forum refused the post's content (HTTP 422)
    Rejected { message: String, errors: Vec<String> },
    /// Any other failure, including transport errors and cancellation
    Failed { status: Option<u16>, message: String },
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Published { .. })
    }

    /// Message suitable for the user
    pub fn message(&self) -> String {
        match self {
            Self::Published { topic_id, .. } => match topic_id {
                Some(id) => format!("Published topic {}", id),
                None => "Published".to_string(),
            },
            Self::Rejected { message, errors } if errors.is_empty() => message.clone(),
            Self::Rejected { message, errors } => format!("{} ({})", message, errors.join("; ")),
            Self::Failed { message, .. } => message.clone(),
        }
    }
}

/// One reference and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub reference: Reference,
    pub result: UploadResult,
}

/// Everything a publish operation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub title: String,
    pub outcome: PublishOutcome,
    pub uploads: Vec<UploadRecord>,
    /// The rewritten markup that was (or would have been) submitted
    pub content: String,
}

impl PublishReport {
    pub fn uploaded_count(&self) -> usize {
        self.uploads.iter().filter(|u| u.result.is_success()).count()
    }

    pub fn failed_uploads(&self) -> impl Iterator<Item = &UploadRecord> {
        self.uploads.iter().filter(|u| !u.result.is_success())
    }
}
