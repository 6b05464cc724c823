//! # vaultpost
//!
//! Publish Obsidian notes as Discourse topics. Every `![[embed]]` in the note
//! is uploaded first and rewritten to a standard Markdown image pointing at
//! the forum's copy.
//!
//! This crate ties the workspace together for the `vaultpost` binary:
//! layered settings ([`settings`]) and report rendering ([`report`]).

pub mod report;
pub mod settings;

pub use settings::{CliOverrides, load_settings};
pub use vaultpost_client::ForumClient;
pub use vaultpost_core::prelude::*;
pub use vaultpost_publish::prelude::*;
pub use vaultpost_vault::VaultManager;
