//! The whole publish: extract, upload, rewrite, post.

use crate::notify::{Notifier, NullNotifier};
use crate::orchestrator::UploadOrchestrator;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use vaultpost_client::ForumClient;
use vaultpost_core::prelude::*;
use vaultpost_parser::{extract_references, rewrite_embeds};
use vaultpost_vault::{AssetResolver, VaultManager};

const CANCELLED_MESSAGE: &str = "cancelled";

/// Publishes vault notes as forum topics.
pub struct Publisher {
    vault: Arc<VaultManager>,
    client: ForumClient,
    orchestrator: UploadOrchestrator,
    notifier: Arc<dyn Notifier>,
}

impl Publisher {
    /// Publisher that resolves embeds against `vault`
    pub fn new(vault: Arc<VaultManager>, client: ForumClient) -> Self {
        let resolver: Arc<dyn AssetResolver> = vault.clone();
        let orchestrator = UploadOrchestrator::new(resolver, client.clone());
        Self {
            vault,
            client,
            orchestrator,
            notifier: Arc::new(NullNotifier),
        }
    }

    /// Resolve embeds with `resolver` instead of the vault
    pub fn with_resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.orchestrator = UploadOrchestrator::new(resolver, self.client.clone())
            .with_notifier(self.notifier.clone());
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.orchestrator = self.orchestrator.with_notifier(notifier.clone());
        self.notifier = notifier;
        self
    }

    pub fn vault(&self) -> &VaultManager {
        &self.vault
    }

    /// Read a note from the vault and publish it, titled by its file stem.
    pub async fn publish_note(
        &self,
        path: &Path,
        category: u64,
        cancel: &CancellationToken,
    ) -> Result<PublishReport> {
        let content = self.vault.read_note(path).await?;
        self.publish(&Document::from_path(path, content), category, cancel)
            .await
    }

    /// Publish `document` into `category`.
    ///
    /// Upload failures do not stop the publish; their markers stay in the
    /// posted text. An `Err` means the pipeline itself is broken, every
    /// forum-side problem is reported through [`PublishReport::outcome`].
    #[instrument(skip(self, document, cancel), fields(title = %document.name), name = "publish")]
    pub async fn publish(
        &self,
        document: &Document,
        category: u64,
        cancel: &CancellationToken,
    ) -> Result<PublishReport> {
        let references = extract_references(&document.content);
        log::info!(
            "Publishing '{}' with {} embedded asset(s)",
            document.name,
            references.len()
        );

        let results = self
            .orchestrator
            .upload_all(&references, document.context_path(), cancel)
            .await;
        let content = rewrite_embeds(&document.content, &references, &results)?;

        let outcome = if cancel.is_cancelled() {
            PublishOutcome::Failed {
                status: None,
                message: CANCELLED_MESSAGE.to_string(),
            }
        } else {
            self.client
                .create_topic(&document.name, &content, category)
                .await
        };

        if outcome.is_success() {
            log::info!("{}", outcome.message());
        } else {
            log::warn!("Publish of '{}' failed: {}", document.name, outcome.message());
            self.notifier.notify(&outcome.message());
        }

        let uploads = references
            .into_iter()
            .zip(results)
            .map(|(reference, result)| UploadRecord { reference, result })
            .collect();

        Ok(PublishReport {
            title: document.name.clone(),
            outcome,
            uploads,
            content,
        })
    }
}
