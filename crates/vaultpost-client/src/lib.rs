//! # Forum Client
//!
//! HTTP side of the publish pipeline:
//! - [`multipart`]: byte-exact `multipart/form-data` encoding
//! - [`transport`]: the [`HttpTransport`] seam and its `reqwest` implementation
//! - [`forum`]: typed upload, topic and category calls
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultpost_client::ForumClient;
//! use vaultpost_core::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let config = ForumConfig::builder("https://forum.example.com", "api-key", "alice").build()?;
//! let client = ForumClient::new(config)?;
//!
//! let asset = ResolvedAsset::new("cat.png", "image/png", std::fs::read("cat.png")?);
//! let url = client.upload_asset(asset).await?;
//! let outcome = client
//!     .create_topic("Trip", &format!("![cat.png]({})", url), 1)
//!     .await;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```

pub mod forum;
pub mod multipart;
pub mod transport;

pub use forum::{ForumClient, UPLOAD_FILE_FIELD, UPLOAD_TYPE_COMPOSER};
pub use multipart::{Boundary, MultipartBody, Part, encode, encode_with_fresh_boundary};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
