//! Process-wide HTTP client for pre-signed URL downloads
//!
//! The client is created once (explicitly via [`init_http_client`] or lazily on
//! first use) and reused across invocations so connections are pooled instead
//! of opening a new socket set per download. [`shutdown_http_client`] drops it.

use log::{debug, info};
use reqwest::Client;
use std::sync::RwLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

lazy_static::lazy_static! {
    static ref HTTP_CLIENT: RwLock<Option<Client>> = RwLock::new(None);
}

fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder().connect_timeout(CONNECT_TIMEOUT).build()
}

/// Create the shared client. Calling it again keeps the existing client.
pub fn init_http_client() -> Result<(), reqwest::Error> {
    let mut slot = HTTP_CLIENT.write().unwrap_or_else(|e| e.into_inner());
    if slot.is_none() {
        *slot = Some(build_client()?);
        info!("http_client_init");
    }
    Ok(())
}

/// Drop the shared client. A later download re-creates it on demand.
pub fn shutdown_http_client() {
    let mut slot = HTTP_CLIENT.write().unwrap_or_else(|e| e.into_inner());
    if slot.take().is_some() {
        info!("http_client_shutdown");
    }
}

/// Get a handle to the shared client, creating it if needed.
///
/// `reqwest::Client` is reference counted, so the returned clone shares the
/// same connection pool.
pub fn http_client() -> Result<Client, reqwest::Error> {
    if let Some(client) = HTTP_CLIENT
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
    {
        return Ok(client.clone());
    }

    debug!("http_client_lazy_init");
    init_http_client()?;
    let slot = HTTP_CLIENT.read().unwrap_or_else(|e| e.into_inner());
    match slot.as_ref() {
        Some(client) => Ok(client.clone()),
        // Raced with a shutdown; hand out a private client for this call
        None => build_client(),
    }
}

pub fn is_initialized() -> bool {
    HTTP_CLIENT
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .is_some()
}
