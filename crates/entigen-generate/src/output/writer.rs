use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::GenerationError;
use crate::model::{CodeArtifact, GenerationReport};

/// Write every artifact under `out_dir`, concurrently.
///
/// Writes are independent: a failing write never stops the others. The
/// returned report lists failures sorted by path.
pub async fn write_artifacts(out_dir: &Path, artifacts: &[CodeArtifact]) -> GenerationReport {
    let mut report = GenerationReport::new(artifacts.len());
    let mut tasks = JoinSet::new();

    for artifact in artifacts {
        let relative = artifact.target_path.clone();
        let path = resolve(out_dir, &relative);
        let content = artifact.content.clone();
        tasks.spawn(async move {
            let result = write_bytes_atomic(&path, content.as_bytes())
                .await
                .map_err(|source| GenerationError::Write { path, source });
            (relative, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((relative, Ok(()))) => {
                debug!(event = "artifact.written", path = %relative);
                report.record_written();
            }
            Ok((relative, Err(err))) => {
                warn!(event = "artifact.write_failed", path = %relative, error = %err);
                report.record_failure(relative, err);
            }
            Err(err) => {
                warn!(event = "artifact.task_failed", error = %err);
                report.record_failure("<unknown>", err);
            }
        }
    }

    report
        .failures
        .sort_by(|left, right| left.path.cmp(&right.path));
    report
}

/// Join a `/`-separated relative path onto `out_dir`.
pub fn resolve(out_dir: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(out_dir.to_path_buf(), |path, segment| path.join(segment))
}

/// Write through a sibling temp file and rename it into place.
pub async fn write_bytes_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(err) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(err);
    }
    Ok(())
}

fn temp_path(path: &Path) -> std::io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid path for atomic write: {}", path.display()),
        )
    })?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths_segment_by_segment() {
        let path = resolve(Path::new("/tmp/out"), "src/routes/[table]/+page.ts");
        assert_eq!(
            path,
            Path::new("/tmp/out")
                .join("src")
                .join("routes")
                .join("[table]")
                .join("+page.ts")
        );
    }
}
