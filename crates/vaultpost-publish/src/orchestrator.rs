//! Sequential upload of every embedded asset in a note.

use crate::notify::{Notifier, NullNotifier};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use vaultpost_client::ForumClient;
use vaultpost_core::prelude::*;
use vaultpost_vault::AssetResolver;

/// Resolves and uploads references one at a time.
///
/// A failed reference never stops the batch: it gets its own
/// [`UploadResult::Failed`] entry and the loop moves on.
#[derive(Clone)]
pub struct UploadOrchestrator {
    resolver: Arc<dyn AssetResolver>,
    client: ForumClient,
    notifier: Arc<dyn Notifier>,
}

impl UploadOrchestrator {
    pub fn new(resolver: Arc<dyn AssetResolver>, client: ForumClient) -> Self {
        Self {
            resolver,
            client,
            notifier: Arc::new(NullNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Upload every reference in order.
    ///
    /// The returned vector has exactly one entry per reference, at the same
    /// index. Once `cancel` fires, the in-flight reference and all remaining
    /// ones are marked [`UploadFailure::Cancelled`].
    #[instrument(skip_all, fields(count = references.len(), context = %context.display()), name = "upload_all")]
    pub async fn upload_all(
        &self,
        references: &[Reference],
        context: &Path,
        cancel: &CancellationToken,
    ) -> Vec<UploadResult> {
        let mut results = Vec::with_capacity(references.len());

        for (index, reference) in references.iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!(
                    "Upload cancelled, skipping {} remaining reference(s)",
                    references.len() - index
                );
                results.resize(
                    references.len(),
                    UploadResult::failed(UploadFailure::Cancelled),
                );
                break;
            }

            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::Cancelled),
                attempt = self.upload_one(reference, context) => attempt,
            };

            match attempt {
                Ok(url) => {
                    log::debug!("Uploaded {} -> {}", reference, url);
                    results.push(UploadResult::uploaded(url));
                }
                Err(e) => {
                    let failure = UploadFailure::from_error(&e);
                    if failure != UploadFailure::Cancelled {
                        let notice = failure_notice(reference, &failure);
                        log::warn!("{}", notice);
                        self.notifier.notify(&notice);
                    }
                    results.push(UploadResult::failed(failure));
                }
            }
        }

        results
    }

    async fn upload_one(&self, reference: &Reference, context: &Path) -> Result<String> {
        let asset = self.resolver.resolve(reference, context).await?;
        self.client.upload_asset(asset).await
    }
}

fn failure_notice(reference: &Reference, failure: &UploadFailure) -> String {
    match failure {
        UploadFailure::Unresolved { .. } => {
            format!("Unable to resolve file path for: {}", reference.target)
        }
        UploadFailure::Unreadable { reason } => {
            format!("Unable to read {}: {}", reference.target, reason)
        }
        other => format!("Error uploading {}: {}", reference.target, other),
    }
}
