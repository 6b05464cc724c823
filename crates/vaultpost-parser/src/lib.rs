//! # Vaultpost Parser
//!
//! Obsidian embed handling for the publish pipeline.
//!
//! This crate provides:
//! - [`extract_references`]: find every `![[target]]` embed, in order, with positions
//! - [`rewrite_embeds`]: replace uploaded embeds with standard markdown images
//!
//! ## Quick Start
//!
//! ```
//! use vaultpost_core::UploadResult;
//! use vaultpost_parser::{extract_references, rewrite_embeds};
//!
//! let note = "Sunset:\n![[sunset.jpg]]";
//! let refs = extract_references(note);
//! let results = vec![UploadResult::uploaded("https://forum.example.com/uploads/sunset.jpg")];
//!
//! let rewritten = rewrite_embeds(note, &refs, &results).unwrap();
//! assert_eq!(
//!     rewritten,
//!     "Sunset:\n![sunset.jpg](https://forum.example.com/uploads/sunset.jpg)"
//! );
//! ```
//!
//! ## Supported Syntax
//!
//! - Attachments: `![[image.png]]`
//! - Folders: `![[attachments/image.png]]`
//! - Size or alias suffix: `![[image.png|300]]` (kept verbatim in the identifier)
//!
//! Markers never span lines, and an identifier ends at the first `]]`.

pub mod embeds;
pub mod rewrite;

pub use embeds::{extract_reference_targets, extract_references};
pub use rewrite::{markdown_image, rewrite_embeds};
