//! # Publish Pipeline
//!
//! Turns a vault note into a forum topic:
//! 1. Extract `![[embed]]` references
//! 2. Resolve and upload each asset ([`UploadOrchestrator`])
//! 3. Rewrite successful embeds as `![name](url)`
//! 4. Create the topic ([`Publisher`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use vaultpost_client::ForumClient;
//! use vaultpost_publish::prelude::*;
//! use vaultpost_vault::VaultManager;
//!
//! # async fn example() -> Result<()> {
//! let vault = VaultManager::new(VaultConfig::builder("/path/to/vault").build()?)?;
//! let forum = ForumConfig::builder("https://forum.example.com", "key", "alice").build()?;
//!
//! let publisher = Publisher::new(Arc::new(vault), ForumClient::new(forum)?)
//!     .with_notifier(Arc::new(LogNotifier));
//! let report = publisher
//!     .publish_note(Path::new("Trips/Lisbon.md"), 1, &CancellationToken::new())
//!     .await?;
//! println!("{} ({} uploads)", report.outcome.message(), report.uploaded_count());
//! # Ok(())
//! # }
//! ```

pub mod notify;
pub mod orchestrator;
pub mod publisher;
pub mod select;

pub use notify::{LogNotifier, Notifier, NullNotifier};
pub use orchestrator::UploadOrchestrator;
pub use publisher::Publisher;
pub use select::{CategorySelector, FixedCategory, PromptSelector, choose_category};

pub mod prelude {
    pub use crate::notify::*;
    pub use crate::orchestrator::*;
    pub use crate::publisher::*;
    pub use crate::select::*;
    pub use vaultpost_core::prelude::*;
}
