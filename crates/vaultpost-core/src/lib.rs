//! # Vaultpost Core
//!
//! Core data models, error types, and configuration for publishing vault notes
//! to a forum. This crate defines the canonical types that all other crates
//! depend on.
//!
//! ## Architecture Principles
//!
//! - **Type-Driven Design**: upload and publish outcomes are enums, not status strings
//! - **Zero Panic in Libraries**: All errors are `Result<T, Error>`
//! - **Builder Pattern for Complex Types**: Configuration structs use builders
//! - **Explicit Configuration**: settings are values handed to each component
//!
//! ## Core Modules
//!
//! - [`models`] - Pipeline data types (Document, Reference, UploadResult, etc.)
//! - [`error`] - Error taxonomy and Result alias
//! - [`config`] - Vault and forum configuration
//!
//! ## Usage Examples
//!
//! ```
//! use vaultpost_core::prelude::*;
//!
//! let doc = Document::new("Trip Report", "Look: ![[cat.png]]");
//! let reference = Reference::new("cat.png");
//! assert_eq!(reference.marker(), "![[cat.png]]");
//!
//! let result = UploadResult::uploaded("https://forum.example.com/uploads/cat.png");
//! assert!(result.is_success());
//! # let _ = doc;
//! ```
//!
//! ### Error Handling
//!
//! ```
//! use vaultpost_core::prelude::*;
//!
//! fn lookup() -> Result<()> {
//!     Err(Error::reference_not_found("missing.png"))
//! }
//!
//! let failure = UploadFailure::from_error(&lookup().unwrap_err());
//! assert!(matches!(failure, UploadFailure::Unresolved { .. }));
//! ```

pub mod config;
pub mod error;
pub mod models;

pub use config::*;
pub use error::{Error, Result};
pub use models::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ForumConfig, SyncConfig, UrlField, VaultConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        Category, Document, PublishOutcome, PublishReport, Reference, ResolvedAsset,
        SourcePosition, UploadFailure, UploadRecord, UploadResult,
    };
}
