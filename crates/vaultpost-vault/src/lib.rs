//! # Vault Access
//!
//! Read-only vault operations used by the publish pipeline:
//! - Reading notes and attachment bytes with path-traversal protection
//! - Resolving `![[embed]]` targets the way Obsidian does
//! - The [`AssetResolver`] seam the upload orchestrator depends on
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultpost_vault::prelude::*;
//! use std::path::Path;
//!
//! # async fn example() -> Result<()> {
//! let config = VaultConfig::builder("/path/to/vault").build()?;
//! let manager = VaultManager::new(config)?;
//!
//! let note = manager.read_note(Path::new("Trips/Lisbon.md")).await?;
//! let asset = manager
//!     .resolve(&Reference::new("tram.jpg"), Path::new("Trips/Lisbon.md"))
//!     .await?;
//! println!("{} bytes of {}", asset.byte_length, asset.mime_hint);
//! # let _ = note;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`vaultpost_core::Result<T>`]. Resolution keeps the
//! "no such reference" and "unreadable file" cases apart so callers can tell
//! the user which one happened.

pub mod manager;
pub mod resolver;

pub use manager::VaultManager;
pub use resolver::{AssetResolver, mime_hint};
pub use vaultpost_core::prelude::*;

pub mod prelude {
    pub use crate::manager::*;
    pub use crate::resolver::*;
    pub use vaultpost_core::prelude::*;
}
