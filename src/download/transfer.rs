//! Transfer executor: fetch, write, optional source delete, verify

use futures_util::StreamExt;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

use super::source::{ObjectBody, ObjectSource};
use super::types::{DownloadRequest, ObjectCandidate, SingleResultObject, WriteMode, WRITE_BUFFER_SIZE};
use crate::error::{Error, Result};

/// Download one accepted candidate to `destination`.
///
/// Only called for a write decision. Steps run in order and any failure aborts:
/// create the destination directory, read the object, write it, delete the
/// source when requested (credential mode only), then verify the file exists.
pub async fn execute<S: ObjectSource + ?Sized>(
    source: &S,
    request: &DownloadRequest,
    candidate: &ObjectCandidate,
    destination: &Path,
    overwrite: bool,
    cancel: &CancellationToken,
) -> Result<SingleResultObject> {
    tokio::fs::create_dir_all(&request.destination_directory)
        .await
        .map_err(|e| Error::fs("create destination directory", &request.destination_directory, e))?;

    let body = source.open(candidate).await?;
    let written = match request.write_mode {
        WriteMode::Buffered => write_buffered(body, destination).await?,
        WriteMode::Streaming => write_streaming(body, destination, cancel).await?,
    };
    info!(
        "transfer_written: {} -> {} bytes={} overwrite={}",
        candidate.key,
        destination.display(),
        written,
        overwrite
    );

    let mut source_deleted = false;
    if request.delete_source_object && request.is_credential_mode() {
        source.delete(&candidate.key).await?;
        source_deleted = true;
        info!("transfer_source_deleted: {}", candidate.key);
    }

    let exists = tokio::fs::try_exists(destination)
        .await
        .map_err(|e| Error::fs("verify destination", destination, e))?;
    if !exists {
        return Err(Error::InternalConsistency(format!(
            "{} is missing after a successful write",
            destination.display()
        )));
    }

    Ok(SingleResultObject {
        object_name: candidate.basename().to_string(),
        full_path: destination.to_path_buf(),
        overwritten: overwrite,
        source_deleted,
        info: None,
    })
}

async fn write_buffered(mut body: ObjectBody, destination: &Path) -> Result<u64> {
    let mut content = Vec::new();
    while let Some(chunk) = body.next().await {
        content.extend_from_slice(&chunk?);
    }

    tokio::fs::write(destination, &content)
        .await
        .map_err(|e| Error::fs("write destination", destination, e))?;
    Ok(content.len() as u64)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

async fn write_streaming(
    mut body: ObjectBody,
    destination: &Path,
    cancel: &CancellationToken,
) -> Result<u64> {
    let partial = partial_path(destination);
    let result = stream_to_file(&mut body, &partial, cancel).await;

    let written = match result {
        Ok(written) => written,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, destination)
        .await
        .map_err(|e| Error::fs("replace destination", destination, e))?;
    Ok(written)
}

async fn stream_to_file(
    body: &mut ObjectBody,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<u64> {
    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| Error::fs("create file", path, e))?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let mut written: u64 = 0;

    while let Some(chunk) = body.next().await {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let chunk = chunk?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| Error::fs("write file", path, e))?;
        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| Error::fs("flush file", path, e))?;
    debug!("stream_done: {} bytes={}", path.display(), written);
    Ok(written)
}
