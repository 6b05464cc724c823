//! End-to-end publish scenarios against an in-memory forum.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vaultpost_client::{ForumClient, HttpRequest, HttpResponse, HttpTransport};
use vaultpost_publish::prelude::*;
use vaultpost_vault::VaultManager;

/// Answers uploads with a URL derived from the request count and records
/// every request it sees.
#[derive(Default)]
struct CountingTransport {
    uploads: AtomicUsize,
    topics: AtomicUsize,
    topic_status: Option<(u16, String)>,
    upload_delay: Option<Duration>,
    /// 1-based upload attempt answered with 500
    reject_upload: Option<usize>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl HttpTransport for CountingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if request.url.ends_with("/uploads.json") {
            if let Some(delay) = self.upload_delay {
                tokio::time::sleep(delay).await;
            }
            let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
            if self.reject_upload == Some(n) {
                return Ok(HttpResponse::new(500, "upload processing failed"));
            }
            return Ok(HttpResponse::new(
                200,
                format!(r#"{{"url":"https://cdn.example/{}.png"}}"#, n),
            ));
        }

        if request.url.ends_with("/posts.json") {
            self.topics.fetch_add(1, Ordering::SeqCst);
            let (status, body) = self
                .topic_status
                .clone()
                .unwrap_or((200, r#"{"id":1,"topic_id":2}"#.to_string()));
            return Ok(HttpResponse::new(status, body));
        }

        Ok(HttpResponse::new(404, "not found"))
    }
}

/// Records notices
#[derive(Default)]
struct Collect(Mutex<Vec<String>>);

impl Notifier for Collect {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

fn vault_with(files: &[(&str, &[u8])]) -> (TempDir, Arc<VaultManager>) {
    vault_limited(files, vaultpost_core::config::DEFAULT_MAX_ASSET_SIZE)
}

fn vault_limited(files: &[(&str, &[u8])], max_asset_size: u64) -> (TempDir, Arc<VaultManager>) {
    let dir = TempDir::new().unwrap();
    for (rel, bytes) in files {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }
    let config = VaultConfig::builder(dir.path())
        .max_asset_size(max_asset_size)
        .build()
        .unwrap();
    (dir, Arc::new(VaultManager::new(config).unwrap()))
}

fn publisher(
    vault: Arc<VaultManager>,
    transport: Arc<CountingTransport>,
    notifier: Arc<Collect>,
) -> Publisher {
    let config = ForumConfig::builder("https://forum.example.com", "key", "alice")
        .build()
        .unwrap();
    Publisher::new(vault, ForumClient::with_transport(config, transport)).with_notifier(notifier)
}

#[tokio::test]
async fn test_missing_asset_is_skipped_and_left_in_place() {
    let (_dir, vault) = vault_with(&[("attachments/cat.png", b"meow".as_slice())]);
    let transport = Arc::new(CountingTransport::default());
    let notices = Arc::new(Collect::default());
    let publisher = publisher(vault, transport.clone(), notices.clone());

    let document = Document::new("Trip", "![[cat.png]] and ![[missing.png]]");
    let report = publisher
        .publish(&document, 3, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(transport.uploads.load(Ordering::SeqCst), 1);
    assert_eq!(report.content, "![cat.png](https://cdn.example/1.png) and ![[missing.png]]");
    assert_eq!(report.uploaded_count(), 1);
    assert!(matches!(
        report.uploads[1].result,
        UploadResult::Failed(UploadFailure::Unresolved { .. })
    ));
    assert!(report.outcome.is_success());

    let notices = notices.0.lock().unwrap();
    assert_eq!(notices.as_slice(), ["Unable to resolve file path for: missing.png"]);

    let requests = transport.requests.lock().unwrap();
    let topic = requests.last().unwrap();
    let body: serde_json::Value = serde_json::from_slice(&topic.body).unwrap();
    assert_eq!(body["title"], "Trip");
    assert_eq!(body["category"], 3);
    assert_eq!(body["raw"], report.content.as_str());
}

#[tokio::test]
async fn test_duplicate_embeds_each_uploaded() {
    let (_dir, vault) = vault_with(&[("a.png", b"a".as_slice())]);
    let transport = Arc::new(CountingTransport::default());
    let publisher = publisher(vault, transport.clone(), Arc::default());

    let document = Document::new("Dupes", "![[a.png]]\n![[a.png]]");
    let report = publisher
        .publish(&document, 1, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(transport.uploads.load(Ordering::SeqCst), 2);
    assert_eq!(
        report.content,
        "![a.png](https://cdn.example/1.png)\n![a.png](https://cdn.example/2.png)"
    );
}

#[tokio::test]
async fn test_note_without_embeds_is_posted_verbatim() {
    let (_dir, vault) = vault_with(&[]);
    let transport = Arc::new(CountingTransport::default());
    let publisher = publisher(vault, transport.clone(), Arc::default());

    let text = "Plain text with [[a wiki link]] and ![alt](http://x/y.png)";
    let report = publisher
        .publish(&Document::new("Plain", text), 1, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.content, text);
    assert!(report.uploads.is_empty());
    assert_eq!(transport.uploads.load(Ordering::SeqCst), 0);
    assert_eq!(transport.topics.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_publish_note_uses_file_stem_as_title() {
    let (_dir, vault) = vault_with(&[
        ("Trips/Lisbon.md", b"Tram: ![[tram.jpg|400]]".as_slice()),
        ("Trips/tram.jpg", b"jpeg".as_slice()),
    ]);
    let transport = Arc::new(CountingTransport::default());
    let publisher = publisher(vault, transport.clone(), Arc::default());

    let report = publisher
        .publish_note(Path::new("Trips/Lisbon.md"), 1, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.title, "Lisbon");
    assert_eq!(report.content, "Tram: ![tram.jpg|400](https://cdn.example/1.png)");

    let requests = transport.requests.lock().unwrap();
    let upload = &requests[0];
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("filename=\"tram.jpg\""));
    assert!(body.contains("Content-Type: image/jpeg"));
}

#[tokio::test]
async fn test_rejected_topic_is_reported_and_notified() {
    let (_dir, vault) = vault_with(&[]);
    let transport = Arc::new(CountingTransport {
        topic_status: Some((422, r#"{"errors":["Title is too short"]}"#.to_string())),
        ..Default::default()
    });
    let notices = Arc::new(Collect::default());
    let publisher = publisher(vault, transport, notices.clone());

    let report = publisher
        .publish(&Document::new("Hi", "short"), 1, &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(report.outcome, PublishOutcome::Rejected { .. }));
    let notices = notices.0.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("Title is too short"));
}

#[tokio::test]
async fn test_cancel_before_start_posts_nothing() {
    let (_dir, vault) = vault_with(&[("a.png", b"a".as_slice()), ("b.png", b"b".as_slice())]);
    let transport = Arc::new(CountingTransport::default());
    let publisher = publisher(vault, transport.clone(), Arc::default());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = publisher
        .publish(&Document::new("Gone", "![[a.png]] ![[b.png]]"), 1, &cancel)
        .await
        .unwrap();

    assert_eq!(transport.requests.lock().unwrap().len(), 0);
    assert_eq!(report.content, "![[a.png]] ![[b.png]]");
    assert!(report
        .uploads
        .iter()
        .all(|u| u.result == UploadResult::failed(UploadFailure::Cancelled)));
    assert_eq!(
        report.outcome,
        PublishOutcome::Failed {
            status: None,
            message: "cancelled".to_string()
        }
    );
}

#[tokio::test]
async fn test_cancel_during_upload_marks_in_flight_and_rest() {
    let (_dir, vault) = vault_with(&[("a.png", b"a".as_slice()), ("b.png", b"b".as_slice())]);
    let transport = Arc::new(CountingTransport {
        upload_delay: Some(Duration::from_secs(30)),
        ..Default::default()
    });
    let publisher = publisher(vault, transport.clone(), Arc::default());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = publisher
        .publish(&Document::new("Slow", "![[a.png]] ![[b.png]]"), 1, &cancel)
        .await
        .unwrap();

    assert_eq!(report.uploads.len(), 2);
    for upload in &report.uploads {
        assert_eq!(upload.result.failure(), Some(&UploadFailure::Cancelled));
    }
    assert_eq!(transport.topics.load(Ordering::SeqCst), 0);
    assert!(!report.outcome.is_success());
}

#[tokio::test]
async fn test_rejected_and_unreadable_between_successes() {
    let (_dir, vault) = vault_limited(
        &[
            ("a.png", b"a".as_slice()),
            ("b.png", b"b".as_slice()),
            ("big.png", [0u8; 64].as_slice()),
            ("c.png", b"c".as_slice()),
        ],
        16,
    );
    let transport = Arc::new(CountingTransport {
        reject_upload: Some(2),
        ..Default::default()
    });
    let notices = Arc::new(Collect::default());
    let publisher = publisher(vault, transport.clone(), notices.clone());

    let text = "![[a.png]] ![[b.png]] ![[big.png]] ![[c.png]]";
    let report = publisher
        .publish(&Document::new("Mixed", text), 1, &CancellationToken::new())
        .await
        .unwrap();

    // big.png never reaches the network
    assert_eq!(transport.uploads.load(Ordering::SeqCst), 3);

    let targets: Vec<&str> = report
        .uploads
        .iter()
        .map(|u| u.reference.target.as_str())
        .collect();
    assert_eq!(targets, ["a.png", "b.png", "big.png", "c.png"]);

    assert_eq!(report.uploads[0].result.url(), Some("https://cdn.example/1.png"));
    assert_eq!(
        report.uploads[1].result.failure(),
        Some(&UploadFailure::Rejected {
            status: 500,
            body: "upload processing failed".to_string()
        })
    );
    assert!(matches!(
        report.uploads[2].result.failure(),
        Some(UploadFailure::Unreadable { .. })
    ));
    assert_eq!(report.uploads[3].result.url(), Some("https://cdn.example/3.png"));

    assert_eq!(
        report.content,
        "![a.png](https://cdn.example/1.png) ![[b.png]] ![[big.png]] ![c.png](https://cdn.example/3.png)"
    );
    assert_eq!(notices.0.lock().unwrap().len(), 2);
    assert!(report.outcome.is_success());
}
