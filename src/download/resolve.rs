//! Discovery of the files one extraction run produced.
//!
//! yt-dlp runs with `--ignore-errors`, so a "successful" run can still
//! produce zero usable files; resolution is the consistency check that
//! catches that case.

use crate::download::error::DownloadError;
use crate::download::{Artifact, MediaKind, RunId};
use std::path::Path;
use tracing::debug;

/// Suffix yt-dlp leaves on incomplete transfers
const INCOMPLETE_SUFFIX: &str = ".part";

/// Collect the artifacts a run left in the download directory.
///
/// Matches names carrying the run's prefix, skips incomplete `.part` files,
/// and sorts by file name so delivery order is deterministic.
///
/// # Errors
///
/// Returns [`DownloadError::NoArtifacts`] when the run produced no usable
/// files, or an I/O error if the directory cannot be scanned.
pub async fn resolve(download_dir: &Path, run: RunId) -> Result<Vec<Artifact>, DownloadError> {
    let prefix = run.file_prefix();
    let mut artifacts = Vec::new();

    let mut entries = tokio::fs::read_dir(download_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(&prefix) || name.ends_with(INCOMPLETE_SUFFIX) {
            continue;
        }

        let path = entry.path();
        let size = entry.metadata().await?.len();
        let kind = MediaKind::from_path(&path);
        artifacts.push(Artifact { path, size, kind });
    }

    artifacts.sort_by(|a, b| a.path.cmp(&b.path));

    if artifacts.is_empty() {
        return Err(DownloadError::NoArtifacts);
    }

    debug!(%run, count = artifacts.len(), "Resolved artifacts");
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_resolves_only_this_runs_files() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let run = RunId::from_raw(100);
        let other = RunId::from_raw(200);

        fs::write(tmp.path().join("ig_100_a.mp4"), vec![0u8; 10])?;
        fs::write(tmp.path().join("ig_100_b.jpg"), vec![0u8; 5])?;
        fs::write(tmp.path().join("ig_200_c.mp4"), vec![0u8; 7])?;

        let artifacts = resolve(tmp.path(), run).await?;
        assert_eq!(artifacts.len(), 2);
        assert!(artifacts.iter().all(|a| a.file_name().starts_with("ig_100_")));

        let artifacts = resolve(tmp.path(), other).await?;
        assert_eq!(artifacts.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_skips_incomplete_transfers() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let run = RunId::from_raw(100);

        fs::write(tmp.path().join("ig_100_a.mp4"), vec![0u8; 10])?;
        fs::write(tmp.path().join("ig_100_b.mp4.part"), vec![0u8; 3])?;

        let artifacts = resolve(tmp.path(), run).await?;
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file_name(), "ig_100_a.mp4");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_run_is_an_error() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        // Only an incomplete file: still counts as nothing produced
        fs::write(tmp.path().join("ig_100_a.mp4.part"), vec![0u8; 3])?;

        let result = resolve(tmp.path(), RunId::from_raw(100)).await;
        assert!(matches!(result, Err(DownloadError::NoArtifacts)));
        Ok(())
    }

    #[tokio::test]
    async fn test_order_and_metadata() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let run = RunId::from_raw(100);

        fs::write(tmp.path().join("ig_100_b.mp4"), vec![0u8; 20])?;
        fs::write(tmp.path().join("ig_100_a.jpg"), vec![0u8; 10])?;
        fs::write(tmp.path().join("ig_100_c.bin"), vec![0u8; 1])?;

        let artifacts = resolve(tmp.path(), run).await?;
        let names: Vec<String> = artifacts.iter().map(Artifact::file_name).collect();
        assert_eq!(names, ["ig_100_a.jpg", "ig_100_b.mp4", "ig_100_c.bin"]);

        assert_eq!(artifacts[0].kind, MediaKind::Photo);
        assert_eq!(artifacts[0].size, 10);
        assert_eq!(artifacts[1].kind, MediaKind::Video);
        assert_eq!(artifacts[2].kind, MediaKind::Document);
        Ok(())
    }
}
