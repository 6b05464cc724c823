//! Asset resolution: reference + context note -> bytes ready for upload

use crate::manager::VaultManager;
use async_trait::async_trait;
use std::path::Path;
use tracing::instrument;
use vaultpost_core::prelude::*;

/// Turns an embed reference into an uploadable asset.
///
/// Implementations report the two failure modes separately:
/// [`Error::ReferenceNotFound`] when no path matches the reference, and
/// [`Error::FileNotFound`]/[`Error::FileTooLarge`]/[`Error::Io`] when a path
/// matched but its bytes could not be read.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, reference: &Reference, context: &Path) -> Result<ResolvedAsset>;
}

#[async_trait]
impl AssetResolver for VaultManager {
    #[instrument(skip(self), fields(reference = %reference.target), name = "vault_resolve_asset")]
    async fn resolve(&self, reference: &Reference, context: &Path) -> Result<ResolvedAsset> {
        let path = self
            .resolve_link_path(reference.link_path(), context)
            .ok_or_else(|| Error::reference_not_found(&reference.target))?;

        let bytes = self.read_binary(&path).await?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| reference.link_path().to_string());

        Ok(ResolvedAsset::new(display_name, mime_hint(&path), bytes))
    }
}

/// MIME type guessed from the file extension
pub fn mime_hint(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
