//! Typed client for the forum endpoints vaultpost talks to.

use crate::multipart::{self, Boundary, MultipartBody, Part};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use vaultpost_core::prelude::*;

/// Upload `type` that makes the asset usable in a post composer
pub const UPLOAD_TYPE_COMPOSER: &str = "composer";

/// Form field the asset bytes travel in
pub const UPLOAD_FILE_FIELD: &str = "files[]";

const UPLOADS_PATH: &str = "uploads.json";
const POSTS_PATH: &str = "posts.json";
const CATEGORIES_PATH: &str = "categories.json?include_subcategories=true";

/// Status the forum uses for semantic rejections of a post
const STATUS_UNPROCESSABLE: u16 = 422;

#[derive(Serialize)]
struct NewTopic<'a> {
    title: &'a str,
    raw: &'a str,
    category: u64,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: Option<u64>,
    topic_id: Option<u64>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    category_list: CategoryList,
}

#[derive(Deserialize)]
struct CategoryList {
    categories: Vec<CategoryEntry>,
}

#[derive(Deserialize)]
struct CategoryEntry {
    id: u64,
    name: String,
    #[serde(default)]
    subcategory_list: Option<Vec<CategoryEntry>>,
}

/// Forum API client. All requests carry the configured API key and username.
#[derive(Clone)]
pub struct ForumClient {
    config: ForumConfig,
    transport: Arc<dyn HttpTransport>,
}

impl ForumClient {
    /// Client using the default `reqwest` transport
    pub fn new(config: ForumConfig) -> Result<Self> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    /// Client using a caller-provided transport
    pub fn with_transport(config: ForumConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ForumConfig {
        &self.config
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("Api-Key", &self.config.api_key)
            .header("Api-Username", &self.config.api_username)
            .timeout(self.config.request_timeout())
    }

    /// Form parts for a synchronous composer upload. The asset's bytes move
    /// into the file part.
    pub fn upload_parts(asset: ResolvedAsset) -> Vec<Part> {
        vec![
            Part::text("type", UPLOAD_TYPE_COMPOSER),
            Part::text("synchronous", "true"),
            Part::file(
                UPLOAD_FILE_FIELD,
                asset.display_name,
                asset.mime_hint,
                asset.bytes,
            ),
        ]
    }

    /// Build the upload request for `asset` using `boundary`.
    pub fn upload_request(&self, asset: ResolvedAsset, boundary: Boundary) -> HttpRequest {
        let body = multipart::encode(&Self::upload_parts(asset), boundary);
        self.multipart_request(body)
    }

    fn multipart_request(&self, body: MultipartBody) -> HttpRequest {
        let content_type = body.content_type();
        self.authorize(HttpRequest::post(
            self.config.endpoint(UPLOADS_PATH),
            body.into_bytes(),
        ))
        .header("Content-Type", content_type)
    }

    /// Upload an asset with a fresh boundary and return its server URL.
    #[instrument(skip(self, asset), fields(asset = %asset.display_name, size = asset.byte_length), name = "forum_upload")]
    pub async fn upload_asset(&self, asset: ResolvedAsset) -> Result<String> {
        // Parts are dropped once encoded; only the body is held while sending
        let body = multipart::encode_with_fresh_boundary(&Self::upload_parts(asset));
        let response = self.transport.send(self.multipart_request(body)).await?;
        self.upload_url(response)
    }

    /// Interpret an upload response: 200 with the configured URL field, or an error.
    pub fn upload_url(&self, response: HttpResponse) -> Result<String> {
        if response.status != 200 {
            return Err(Error::remote_rejected(response.status, response.body));
        }

        let json: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
            Error::parse_error(format!(
                "Upload response (status 200) is not JSON: {}; body: {}",
                e, response.body
            ))
        })?;

        self.config.url_field.extract(&json).ok_or_else(|| {
            Error::parse_error(format!(
                "Upload response (status 200) has no {} field; body: {}",
                self.config.url_field.describe(),
                response.body
            ))
        })
    }

    /// Create a new topic. Never fails: every problem becomes an outcome.
    #[instrument(skip(self, raw), name = "forum_create_topic")]
    pub async fn create_topic(&self, title: &str, raw: &str, category: u64) -> PublishOutcome {
        let payload = NewTopic {
            title,
            raw,
            category,
        };
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                return PublishOutcome::Failed {
                    status: None,
                    message: format!("Failed to encode topic: {}", e),
                };
            }
        };

        let request = self
            .authorize(HttpRequest::post(self.config.endpoint(POSTS_PATH), body))
            .header("Content-Type", "application/json");

        match self.transport.send(request).await {
            Ok(response) => topic_outcome(response),
            Err(e) => PublishOutcome::Failed {
                status: None,
                message: format!("Error publishing to forum: {}", e),
            },
        }
    }

    /// List categories and their subcategories, flattened in server order.
    #[instrument(skip(self), name = "forum_fetch_categories")]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let request = self
            .authorize(HttpRequest::get(self.config.endpoint(CATEGORIES_PATH)))
            .header("Content-Type", "application/json");

        let response = self.transport.send(request).await?;
        if response.status != 200 {
            return Err(Error::remote_rejected(response.status, response.body));
        }

        let parsed: CategoriesResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::parse_error(format!("Invalid categories response: {}", e)))?;

        let mut categories = Vec::new();
        for entry in parsed.category_list.categories {
            categories.push(Category {
                id: entry.id,
                name: entry.name,
            });
            for sub in entry.subcategory_list.unwrap_or_default() {
                categories.push(Category {
                    id: sub.id,
                    name: sub.name,
                });
            }
        }

        log::debug!("Fetched {} categories", categories.len());
        Ok(categories)
    }
}

fn topic_outcome(response: HttpResponse) -> PublishOutcome {
    match response.status {
        200 => {
            let created: Option<CreatedPost> = serde_json::from_str(&response.body).ok();
            PublishOutcome::Published {
                topic_id: created.as_ref().and_then(|c| c.topic_id),
                post_id: created.as_ref().and_then(|c| c.id),
            }
        }
        STATUS_UNPROCESSABLE => {
            let errors = serde_json::from_str::<ErrorBody>(&response.body)
                .unwrap_or_default()
                .errors;
            PublishOutcome::Rejected {
                message: "The forum rejected this post; try a longer title or check it is not a duplicate"
                    .to_string(),
                errors,
            }
        }
        status => PublishOutcome::Failed {
            status: Some(status),
            message: format!("Error publishing to forum: status {}: {}", status, response.body),
        },
    }
}
