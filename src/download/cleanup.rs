//! Best-effort deletion of downloaded artifacts.

use crate::download::{Artifact, RunId};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error, info};

/// Delete every artifact of a run.
///
/// Idempotent and best-effort: missing files are skipped, deletion failures
/// are logged and swallowed. Cleanup must never become a new failure source
/// that masks the outcome it runs after.
pub async fn remove_artifacts(artifacts: &[Artifact]) {
    for artifact in artifacts {
        remove_path(&artifact.path).await;
    }
}

/// Delete everything a run left in the download directory, including
/// incomplete `.part` files a killed extraction can leave behind.
pub async fn sweep_run(download_dir: &Path, run: RunId) {
    let prefix = run.file_prefix();
    let mut entries = match tokio::fs::read_dir(download_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(dir = %download_dir.display(), error = %e, "Sweep could not read download dir");
            return;
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if entry.file_name().to_string_lossy().starts_with(&prefix) {
                    remove_path(&entry.path()).await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!(dir = %download_dir.display(), error = %e, "Sweep aborted");
                break;
            }
        }
    }
}

async fn remove_path(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "Deleted file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "File already gone");
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error deleting file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MediaKind;
    use std::fs;

    fn artifact(path: std::path::PathBuf) -> Artifact {
        Artifact {
            path,
            size: 0,
            kind: MediaKind::Document,
        }
    }

    #[tokio::test]
    async fn test_removes_existing_files() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let a = tmp.path().join("ig_1_a.mp4");
        let b = tmp.path().join("ig_1_b.jpg");
        fs::write(&a, b"x")?;
        fs::write(&b, b"y")?;

        remove_artifacts(&[artifact(a.clone()), artifact(b.clone())]).await;

        assert!(!a.exists());
        assert!(!b.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let gone = tmp.path().join("never_existed.mp4");
        let present = tmp.path().join("ig_1_a.mp4");
        fs::write(&present, b"x")?;

        // Must not fail, and must still delete what does exist
        remove_artifacts(&[artifact(gone), artifact(present.clone())]).await;
        assert!(!present.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_idempotent() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let a = tmp.path().join("ig_1_a.mp4");
        fs::write(&a, b"x")?;

        let set = [artifact(a.clone())];
        remove_artifacts(&set).await;
        remove_artifacts(&set).await;
        assert!(!a.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_sweep_takes_partials_and_spares_other_runs() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let mine = tmp.path().join("ig_7_a.mp4");
        let partial = tmp.path().join("ig_7_b.mp4.part");
        let theirs = tmp.path().join("ig_8_c.mp4");
        fs::write(&mine, b"x")?;
        fs::write(&partial, b"y")?;
        fs::write(&theirs, b"z")?;

        sweep_run(tmp.path(), RunId::from_raw(7)).await;

        assert!(!mine.exists());
        assert!(!partial.exists());
        assert!(theirs.exists());
        Ok(())
    }
}
