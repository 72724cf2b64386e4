//! Existing-destination policy and file lock probing

use log::{debug, warn};
use std::fs::{File, TryLockError};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::types::DestinationFileExistsAction;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteDecision {
    /// Fetch and write; `overwrite` is set when the destination already exists
    Write { overwrite: bool },
    SkipExisting { info: String },
    Fail(PathBuf),
}

pub fn decide(
    policy: DestinationFileExistsAction,
    object_name: &str,
    destination: &Path,
    exists: bool,
) -> WriteDecision {
    match (policy, exists) {
        (DestinationFileExistsAction::Error, true) => {
            WriteDecision::Fail(destination.to_path_buf())
        }
        (DestinationFileExistsAction::Info, true) => WriteDecision::SkipExisting {
            info: format!(
                "Object {} was not downloaded because {} already exists",
                object_name,
                destination.display()
            ),
        },
        (DestinationFileExistsAction::Overwrite, true) => WriteDecision::Write { overwrite: true },
        (_, false) => WriteDecision::Write { overwrite: false },
    }
}

/// Check the destination and decide what to do with it.
pub async fn reconcile(
    policy: DestinationFileExistsAction,
    object_name: &str,
    destination: &Path,
) -> Result<WriteDecision> {
    let exists = tokio::fs::try_exists(destination)
        .await
        .map_err(|e| Error::fs("check destination", destination, e))?;
    Ok(decide(policy, object_name, destination, exists))
}

enum LockProbe {
    Free,
    Locked,
}

fn probe_lock(path: &Path) -> io::Result<LockProbe> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if is_sharing_violation(&e) => return Ok(LockProbe::Locked),
        Err(e) => return Err(e),
    };

    match file.try_lock() {
        Ok(()) => Ok(LockProbe::Free),
        Err(TryLockError::WouldBlock) => Ok(LockProbe::Locked),
        Err(TryLockError::Error(e)) => Err(e),
    }
}

#[cfg(windows)]
fn is_sharing_violation(err: &io::Error) -> bool {
    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    matches!(err.raw_os_error(), Some(32) | Some(33))
}

#[cfg(not(windows))]
fn is_sharing_violation(_err: &io::Error) -> bool {
    false
}

/// Wait until `path` can be opened exclusively.
///
/// Checks once, then up to `retries` more times with `interval` between
/// attempts. Gives up with [`Error::LockTimeout`] when the file stays locked.
pub async fn ensure_unlocked(
    path: &Path,
    retries: u32,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut attempt: u32 = 0;
    loop {
        match probe_lock(path).map_err(|e| Error::fs("open destination exclusively", path, e))? {
            LockProbe::Free => {
                debug!("lock_free: {} attempt={}", path.display(), attempt);
                return Ok(());
            }
            LockProbe::Locked if attempt >= retries => {
                warn!(
                    "lock_timeout: {} retries={}",
                    path.display(),
                    retries
                );
                return Err(Error::LockTimeout {
                    path: path.to_path_buf(),
                    retries,
                });
            }
            LockProbe::Locked => {
                debug!("lock_wait: {} attempt={}", path.display(), attempt);
            }
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FAST: Duration = Duration::from_millis(20);

    #[test]
    fn error_policy_fails_on_existing_destination() {
        let path = Path::new("/out/a.txt");
        assert_eq!(
            decide(DestinationFileExistsAction::Error, "a.txt", path, true),
            WriteDecision::Fail(path.to_path_buf())
        );
    }

    #[test]
    fn info_policy_skips_with_message() {
        let decision = decide(
            DestinationFileExistsAction::Info,
            "a.txt",
            Path::new("/out/a.txt"),
            true,
        );
        match decision {
            WriteDecision::SkipExisting { info } => {
                assert!(info.contains("a.txt"));
                assert!(info.contains("/out/a.txt"));
            }
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn absent_destination_always_writes() {
        for policy in [
            DestinationFileExistsAction::Overwrite,
            DestinationFileExistsAction::Info,
            DestinationFileExistsAction::Error,
        ] {
            assert_eq!(
                decide(policy, "a.txt", Path::new("/out/a.txt"), false),
                WriteDecision::Write { overwrite: false }
            );
        }
        assert_eq!(
            decide(
                DestinationFileExistsAction::Overwrite,
                "a.txt",
                Path::new("/out/a.txt"),
                true
            ),
            WriteDecision::Write { overwrite: true }
        );
    }

    #[tokio::test]
    async fn reconcile_reads_existence_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let decision = reconcile(DestinationFileExistsAction::Error, "a.txt", &path)
            .await
            .unwrap();
        assert_eq!(decision, WriteDecision::Write { overwrite: false });

        std::fs::write(&path, b"old").unwrap();
        let decision = reconcile(DestinationFileExistsAction::Error, "a.txt", &path)
            .await
            .unwrap();
        assert_eq!(decision, WriteDecision::Fail(path.clone()));
    }

    #[tokio::test]
    async fn unlocked_file_passes_immediately() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("free.txt");
        std::fs::write(&path, b"data").unwrap();

        ensure_unlocked(&path, 0, FAST, &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn lock_held_past_retries_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.txt");
        std::fs::write(&path, b"data").unwrap();
        let holder = File::open(&path).unwrap();
        holder.lock().unwrap();

        let err = ensure_unlocked(&path, 2, FAST, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LockTimeout { retries: 2, .. }));
        drop(holder);
    }

    #[tokio::test]
    async fn lock_released_within_retries_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("busy.txt");
        std::fs::write(&path, b"data").unwrap();
        let holder = File::open(&path).unwrap();
        holder.lock().unwrap();

        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            drop(holder);
        });

        ensure_unlocked(&path, 50, FAST, &CancellationToken::new())
            .await
            .unwrap();
        release.await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_interrupts_retry_loop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.txt");
        std::fs::write(&path, b"data").unwrap();
        let holder = File::open(&path).unwrap();
        holder.lock().unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = ensure_unlocked(&path, 100, Duration::from_secs(60), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        drop(holder);
    }
}
