//! The download-and-delivery pipeline.
//!
//! One inbound link becomes one [`DownloadRequest`]; the pipeline fetches,
//! resolves, size-gates, uploads, and cleans up. Cleanup is an unconditional
//! exit action — no artifact outlives its request, success or failure.

use crate::bot::sender::MediaSender;
use crate::config::MAX_TOTAL_SIZE_BYTES;
use crate::download::{cleanup, resolve, Artifact, DownloadError, Extractor, MediaKind, RunId};
use crate::utils::format_mb;
use tracing::{error, info};

/// One pipeline invocation. Immutable once created.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Extracted link token
    pub url: String,
    /// Requesting Telegram user
    pub user_id: i64,
    /// Filesystem-namespacing key, unique per request
    pub run: RunId,
}

impl DownloadRequest {
    /// Create a request with a fresh run identifier.
    #[must_use]
    pub fn new(url: String, user_id: i64) -> Self {
        Self {
            url,
            user_id,
            run: RunId::next(),
        }
    }
}

/// Aggregated per-file outcome of one request.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Files sent successfully
    pub delivered: usize,
    /// File names whose send failed
    pub failed: Vec<String>,
    /// Total byte size when the request was rejected over the ceiling;
    /// nothing was sent in that case
    pub oversize: Option<u64>,
}

/// Run the full pipeline for one request: extract, resolve, deliver.
///
/// # Errors
///
/// Returns a [`DownloadError`] when extraction or resolution fails; the
/// caller surfaces its classified user message. Delivery itself does not
/// fail — per-item send failures are isolated into the report.
pub async fn run<S: MediaSender>(
    sender: &S,
    extractor: &Extractor,
    request: &DownloadRequest,
) -> Result<DeliveryReport, DownloadError> {
    info!(user_id = request.user_id, run = %request.run, url = %request.url, "Pipeline started");
    extractor.fetch(&request.url, request.run).await?;
    let artifacts = resolve::resolve(extractor.download_dir(), request.run).await?;
    Ok(deliver(sender, &artifacts).await)
}

/// Size-gate, upload, and clean up a resolved artifact set.
///
/// Artifacts are sent in resolver order, dispatched by media kind. A failed
/// send is reported per item and never aborts the remaining batch. Every
/// return path deletes the artifacts before returning.
pub async fn deliver<S: MediaSender>(sender: &S, artifacts: &[Artifact]) -> DeliveryReport {
    let total: u64 = artifacts.iter().map(|a| a.size).sum();

    if total > MAX_TOTAL_SIZE_BYTES {
        sender
            .edit_status(&format!(
                "❌ Total content size is too large ({}).\nMaximum supported total size is 2GB.",
                format_mb(total)
            ))
            .await;
        cleanup::remove_artifacts(artifacts).await;
        return DeliveryReport {
            oversize: Some(total),
            ..DeliveryReport::default()
        };
    }

    sender
        .edit_status(&format!(
            "⬆️ Uploading {} item(s) ({})...",
            artifacts.len(),
            format_mb(total)
        ))
        .await;

    let mut report = DeliveryReport::default();
    for (index, artifact) in artifacts.iter().enumerate() {
        let caption = format!(
            "✅ Item {}/{} | 📦 {}",
            index + 1,
            artifacts.len(),
            format_mb(artifact.size)
        );

        let sent = match artifact.kind {
            MediaKind::Photo => sender.send_photo(&artifact.path, &caption).await,
            MediaKind::Video => sender.send_video(&artifact.path, &caption).await,
            MediaKind::Document => sender.send_document(&artifact.path, &caption).await,
        };

        match sent {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                error!(path = %artifact.path.display(), error = %e, "Error sending file");
                let name = artifact.file_name();
                let notice = format!("❌ Failed to send item {}: {}", index + 1, name);
                if let Err(notice_err) = sender.send_text(&notice).await {
                    error!(error = %notice_err, "Failed to report per-item send failure");
                }
                report.failed.push(name);
            }
        }
    }

    sender.delete_status().await;
    cleanup::remove_artifacts(artifacts).await;

    info!(
        delivered = report.delivered,
        failed = report.failed.len(),
        "Delivery finished"
    );
    report
}
