//! yt-dlp extraction adapter.
//!
//! Wraps the external `yt-dlp` binary with the fixed option set this bot
//! needs: run-scoped output naming, identity headers, optional cookies.
//! The adapter propagates failures as raw diagnostic text; classification
//! happens in [`crate::download::error`].

use crate::config::{
    COOKIES_FILE, DOWNLOAD_DIR, EXTRACTION_TIMEOUT_SECS, EXTRACTOR_REFERER, EXTRACTOR_USER_AGENT,
    MAX_CONCURRENT_EXTRACTIONS,
};
use crate::download::error::{classify, DownloadError};
use crate::download::RunId;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Static extraction configuration, built once at startup and read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Directory all runs download into
    pub download_dir: PathBuf,
    /// Netscape cookies file, attached only when present on disk
    pub cookies_file: PathBuf,
    /// Browser identity for outbound requests
    pub user_agent: String,
    /// Referer header for outbound requests
    pub referer: String,
    /// Hard bound on one extraction run
    pub timeout: Duration,
    /// Concurrent yt-dlp process limit
    pub max_concurrent: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DOWNLOAD_DIR),
            cookies_file: PathBuf::from(COOKIES_FILE),
            user_agent: EXTRACTOR_USER_AGENT.to_string(),
            referer: EXTRACTOR_REFERER.to_string(),
            timeout: Duration::from_secs(EXTRACTION_TIMEOUT_SECS),
            max_concurrent: MAX_CONCURRENT_EXTRACTIONS,
        }
    }
}

/// Runs yt-dlp with a bounded number of concurrent child processes.
pub struct Extractor {
    config: ExtractorConfig,
    slots: Semaphore,
}

impl Extractor {
    /// Create an extractor from its static configuration.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        let slots = Semaphore::new(config.max_concurrent);
        Self { config, slots }
    }

    /// Directory the extractor downloads into.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    /// Output template namespaced by the run identifier. The `%(id)s`
    /// discriminator keeps carousel items from overwriting each other.
    fn output_template(&self, run: RunId) -> String {
        self.config
            .download_dir
            .join(format!("{}%(id)s.%(ext)s", run.file_prefix()))
            .to_string_lossy()
            .into_owned()
    }

    /// Build the fixed yt-dlp argument set for one run.
    ///
    /// Certificate validation is disabled for the outbound fetch and
    /// per-item errors are tolerated so a carousel with one broken item
    /// still yields the rest. Thumbnails are written because some image
    /// posts are only served that way.
    fn build_args(&self, url: &str, run: RunId) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            self.output_template(run),
            "--no-check-certificate".to_string(),
            "--ignore-errors".to_string(),
            "--write-thumbnail".to_string(),
            "--user-agent".to_string(),
            self.config.user_agent.clone(),
            "--referer".to_string(),
            self.config.referer.clone(),
        ];

        if self.config.cookies_file.exists() {
            info!(cookies_file = %self.config.cookies_file.display(), "Using cookies file");
            args.push("--cookies".to_string());
            args.push(self.config.cookies_file.to_string_lossy().into_owned());
        } else {
            info!("No cookies file found. Stories and private content will not be accessible.");
        }

        args.push(url.to_string());
        args
    }

    /// Run one extraction to completion.
    ///
    /// The child process is killed if it outlives the configured timeout.
    /// On failure the raw stderr diagnostic is logged verbatim and returned
    /// classified.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] if the binary cannot be launched, times
    /// out, or exits with a failure status.
    pub async fn fetch(&self, url: &str, run: RunId) -> Result<(), DownloadError> {
        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| DownloadError::Extractor("extractor is shutting down".to_string()))?;

        let args = self.build_args(url, run);
        info!(%url, %run, "Starting yt-dlp extraction");
        debug!(?args, "yt-dlp arguments");

        let mut cmd = Command::new("yt-dlp");
        cmd.args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.config.timeout, cmd.output())
            .await
            .map_err(|_| {
                error!(%url, %run, "yt-dlp timed out, killing child process");
                DownloadError::Timeout(self.config.timeout.as_secs())
            })?
            .map_err(DownloadError::Spawn)?;

        if output.status.success() {
            debug!(%run, "yt-dlp finished");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr.into_owned()
        };
        // The raw diagnostic always reaches the log even though the user
        // sees a classified message
        error!(%url, %run, diagnostic = %diagnostic, "yt-dlp extraction failed");
        Err(classify(&diagnostic))
    }
}
