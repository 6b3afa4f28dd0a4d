//! HTTP cache proxy: `probe`, `retrieve_bytes`, `retrieve_text` wrap a single
//! `reqwest::Client`, with per-URL request coalescing and cache population
//! layered on top.
//!
//! `file://` locations are handled filesystem-local via `tokio::fs`.

use crate::cache::{ContentBody, ContentCacheEntry, ProbeCacheEntry};
use crate::error::{Error, Result};
use crate::globals::Globals;
use crate::robots::RobotsPolicy;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

/// `HEAD`/existence check. Returns `true` if the resource exists.
#[tracing::instrument(skip_all, fields(url = %url))]
pub async fn probe(globals: &Globals, url: &str) -> Result<bool> {
    if let Some(path) = file_url_to_path(url) {
        return Ok(path.exists());
    }

    let now = Utc::now();
    if let Some(entry) = globals.probe_cache.lock().unwrap().get(url, now) {
        return entry.outcome.clone().map_err(Error::Other);
    }

    if !claim_or_wait(&globals.probe_inflight, url).await {
        // Another caller finished while we waited; re-check the cache.
        let now = Utc::now();
        if let Some(entry) = globals.probe_cache.lock().unwrap().get(url, now) {
            return entry.outcome.clone().map_err(Error::Other);
        }
        return Box::pin(probe(globals, url)).await;
    }

    robots_guard(globals, url).await?;
    let result = do_probe(globals, url).await;

    let (outcome, ttl) = match &result {
        Ok(exists) => (Ok(*exists), globals.config.cache.success_ttl()),
        Err(e) => (Err(e.to_string()), globals.config.cache.error_ttl()),
    };
    globals.probe_cache.lock().unwrap().put(
        url.to_string(),
        ProbeCacheEntry {
            outcome,
            inserted_at: Utc::now(),
            ttl,
        },
    );
    release(&globals.probe_inflight, url);
    result
}

/// `GET` returning raw bytes plus the `Content-Type` header value, if any.
#[tracing::instrument(skip_all, fields(url = %url))]
pub async fn retrieve_bytes(globals: &Globals, url: &str) -> Result<(Vec<u8>, Option<String>)> {
    let body = retrieve(globals, url).await?;
    Ok((body.bytes, body.content_type))
}

/// `GET` validating a textual mimetype, decoding with the charset declared
/// in `Content-Type` (falling back to `charset_default`).
#[tracing::instrument(skip_all, fields(url = %url))]
pub async fn retrieve_text(globals: &Globals, url: &str, charset_default: &str) -> Result<String> {
    let body = retrieve(globals, url).await?;
    if let Some(content_type) = &body.content_type {
        if !is_textual_mimetype(content_type) {
            return Err(Error::DocumentationParseFailure {
                url: url.to_string(),
                reason: format!("non-textual content-type: {content_type}"),
            });
        }
    }
    let charset = if body.charset.is_empty() { charset_default } else { &body.charset };
    decode_with_charset(&body.bytes, charset)
}

async fn retrieve(globals: &Globals, url: &str) -> Result<ContentBody> {
    if let Some(path) = file_url_to_path(url) {
        let bytes = tokio::fs::read(&path).await?;
        return Ok(ContentBody {
            bytes,
            content_type: None,
            charset: "utf-8".to_string(),
        });
    }

    let now = Utc::now();
    if let Some(entry) = globals.content_cache.lock().unwrap().get(url, now) {
        return entry.outcome.clone().map_err(Error::Other);
    }

    if !claim_or_wait(&globals.content_inflight, url).await {
        let now = Utc::now();
        if let Some(entry) = globals.content_cache.lock().unwrap().get(url, now) {
            return entry.outcome.clone().map_err(Error::Other);
        }
        return Box::pin(retrieve(globals, url)).await;
    }

    robots_guard(globals, url).await?;
    let result = do_retrieve(globals, url).await;

    let (outcome, bytes_used, ttl) = match &result {
        Ok(body) => {
            let bytes_used = body.bytes.len() as u64 + 128;
            (Ok(body.clone()), bytes_used, globals.config.cache.success_ttl())
        },
        Err(e) => (Err(e.to_string()), 0, globals.config.cache.error_ttl()),
    };
    let inserted_at = Utc::now();
    globals.content_cache.lock().unwrap().put(
        url.to_string(),
        ContentCacheEntry {
            outcome,
            bytes_used,
            inserted_at,
            last_access: inserted_at,
            ttl,
        },
    );
    release(&globals.content_inflight, url);
    result
}

async fn do_probe(globals: &Globals, url: &str) -> Result<bool> {
    let response = globals
        .client
        .head(url)
        .timeout(globals.config.fetch.probe_timeout())
        .send()
        .await?;
    Ok(response.status().is_success())
}

async fn do_retrieve(globals: &Globals, url: &str) -> Result<ContentBody> {
    let response = globals
        .client
        .get(url)
        .timeout(globals.config.fetch.retrieve_timeout())
        .send()
        .await?;
    if !response.status().is_success() {
        return match response.error_for_status() {
            Ok(_) => unreachable!("status was already checked as an error"),
            Err(e) => Err(Error::Network(e)),
        };
    }
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let charset = content_type
        .as_deref()
        .and_then(extract_charset)
        .unwrap_or_else(|| "utf-8".to_string());
    let bytes = response.bytes().await?.to_vec();
    Ok(ContentBody { bytes, content_type, charset })
}

/// Claim the coalescing slot for `key`, returning `true` if this call is the
/// leader (must perform the fetch and call [`release`]), or `false` after
/// having waited for the leader to finish (caller re-checks the cache).
async fn claim_or_wait(inflight: &std::sync::Mutex<std::collections::HashMap<String, Arc<Notify>>>, key: &str) -> bool {
    let waiter = {
        let mut map = inflight.lock().unwrap();
        if let Some(existing) = map.get(key) {
            Some(existing.clone())
        } else {
            map.insert(key.to_string(), Arc::new(Notify::new()));
            None
        }
    };
    match waiter {
        Some(notify) => {
            notify.notified().await;
            false
        },
        None => true,
    }
}

fn release(inflight: &std::sync::Mutex<std::collections::HashMap<String, Arc<Notify>>>, key: &str) {
    if let Some(notify) = inflight.lock().unwrap().remove(key) {
        notify.notify_waiters();
    }
}

async fn robots_guard(globals: &Globals, url: &str) -> Result<()> {
    if !globals.config.robots.enabled {
        return Ok(());
    }
    let Ok(parsed) = url::Url::parse(url) else {
        return Ok(());
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Ok(());
    }
    let Some(host) = parsed.host_str() else {
        return Ok(());
    };
    let host = host.to_string();
    let now = Utc::now();

    let entry = {
        let mut cache = globals.robots_cache.lock().unwrap();
        cache.get(&host, now).cloned()
    };
    let entry = match entry {
        Some(entry) => entry,
        None => {
            let robots_url = format!("{}://{}/robots.txt", parsed.scheme(), host);
            let body = fetch_robots_body(globals, &robots_url).await;
            let entry = crate::cache::RobotsCacheEntry {
                policy: body.map(|b| RobotsPolicy::parse(&b)),
                next_allowed_at: now,
                inserted_at: now,
                ttl: globals.config.robots.ttl(),
            };
            globals.robots_cache.lock().unwrap().put(host.clone(), entry.clone());
            entry
        },
    };

    let user_agent = globals.config.fetch.user_agent.clone();
    if let Some(policy) = &entry.policy {
        if !policy.can_fetch(&user_agent, parsed.path()) {
            return Err(Error::RobotsTxtBlockedUrl { url: url.to_string(), user_agent });
        }
    }

    let wait_until = globals
        .robots_cache
        .lock()
        .unwrap()
        .get(&host, Utc::now())
        .map(|e| e.next_allowed_at);
    if let Some(wait_until) = wait_until {
        let remaining = wait_until.signed_duration_since(Utc::now());
        if let Ok(remaining) = remaining.to_std() {
            tokio::time::sleep(remaining).await;
        }
    }

    if let Some(delay) = entry.policy.as_ref().and_then(|p| p.crawl_delay(&user_agent)) {
        if let Ok(delay) = chrono::Duration::from_std(delay) {
            let next_allowed_at = Utc::now() + delay;
            globals.robots_cache.lock().unwrap().set_next_allowed_at(&host, next_allowed_at);
        }
    }

    Ok(())
}

async fn fetch_robots_body(globals: &Globals, robots_url: &str) -> Option<String> {
    let response = globals
        .client
        .get(robots_url)
        .timeout(globals.config.robots.fetch_timeout())
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.text().await.ok()
}

fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let stripped = url.strip_prefix("file://")?;
    Some(PathBuf::from(stripped))
}

fn is_textual_mimetype(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime.starts_with("text/")
        || mime == "application/json"
        || mime == "application/xml"
        || mime.ends_with("+json")
        || mime.ends_with("+xml")
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        if !key.eq_ignore_ascii_case("charset") {
            return None;
        }
        Some(value.trim().trim_matches('"').to_string())
    })
}

fn decode_with_charset(bytes: &[u8], charset: &str) -> Result<String> {
    if charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("us-ascii") {
        return String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Other(format!("invalid utf-8: {e}")));
    }
    // No non-UTF-8 codec is wired in; fall back to lossy UTF-8 for any other
    // declared charset rather than failing the whole retrieval.
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
