use std::env;
use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::history::HistoryDoc;

/// Relative path the original page fetched its document from.
pub const DEFAULT_PATH: &str = "data/svs-history.json";

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Where to read the history document from: `SVS_HISTORY_URL` wins,
/// then `SVS_HISTORY_PATH`, then the original's relative path.
pub fn resolve_source() -> String {
    if let Ok(url) = env::var("SVS_HISTORY_URL") {
        if !url.trim().is_empty() {
            return url;
        }
    }
    if let Ok(path) = env::var("SVS_HISTORY_PATH") {
        if !path.trim().is_empty() {
            return path;
        }
    }
    DEFAULT_PATH.to_string()
}

/// Loads and parses the history document. There is exactly one load per
/// run and no retry; a failure leaves the app with an empty table.
pub fn load_history(source: &str) -> Result<HistoryDoc> {
    let raw = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source)?
    } else {
        fs::read_to_string(source).with_context(|| format!("read history file {source}"))?
    };
    serde_json::from_str(&raw).with_context(|| format!("parse history document from {source}"))
}

fn fetch(url: &str) -> Result<String> {
    let resp = http_client()?
        .get(url)
        .send()
        .with_context(|| format!("request {url}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {status}: {body}"));
    }
    Ok(body)
}
