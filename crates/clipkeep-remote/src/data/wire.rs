//! Per-endpoint decoders from raw response bodies to domain records.
//!
//! The service is weakly typed: numbers arrive as integers or floats and most
//! fields are optional on the wire. Each decoder checks exactly the fields its
//! endpoint promises and rejects the response otherwise.

use serde::Deserialize;

use crate::data::model::{ClipHandle, ClipId, RecordedSegment};
use crate::error::{Endpoint, RemoteError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn seconds(&self) -> Option<i64> {
        match *self {
            Number::Int(v) => Some(v),
            Number::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            Number::Float(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn into_clip_id(self) -> Option<ClipId> {
        match self {
            RawId::Int(v) => Some(ClipId(v.to_string())),
            RawId::Text(s) if !s.is_empty() => Some(ClipId(s)),
            RawId::Text(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvailableItem {
    start: Option<Number>,
    end: Option<Number>,
    has_video: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ClipEnvelope {
    status: Option<i64>,
    #[serde(default)]
    items: Vec<ClipItem>,
    status_description: Option<String>,
    status_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClipItem {
    id: Option<RawId>,
    title: Option<String>,
    is_generated: Option<bool>,
    is_error: Option<bool>,
    download_url: Option<String>,
}

/// Decode the `get_available` array into segments, in service order.
pub fn decode_segments(body: &[u8]) -> Result<Vec<RecordedSegment>> {
    let endpoint = Endpoint::ListAvailable;
    let items: Vec<AvailableItem> = serde_json::from_slice(body)
        .map_err(|e| RemoteError::rejected(endpoint, format!("malformed response: {e}")))?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let start = item.start.as_ref().and_then(Number::seconds).ok_or_else(|| {
                RemoteError::rejected(endpoint, format!("item {index} has no numeric start"))
            })?;
            let end = item.end.as_ref().and_then(Number::seconds).ok_or_else(|| {
                RemoteError::rejected(endpoint, format!("item {index} has no numeric end"))
            })?;
            RecordedSegment::new(start, end, item.has_video.unwrap_or(true))
                .map_err(|e| RemoteError::rejected(endpoint, format!("item {index}: {e}")))
        })
        .collect()
}

/// Decode a clip envelope from `clips.request` or `clips.get` into its first item.
pub fn decode_clip(endpoint: Endpoint, body: &[u8]) -> Result<ClipHandle> {
    let envelope = open_envelope(endpoint, body)?;
    let item = envelope
        .items
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::rejected(endpoint, "response has no items[0]"))?;

    let id = item
        .id
        .and_then(RawId::into_clip_id)
        .ok_or_else(|| RemoteError::rejected(endpoint, "items[0] has no id"))?;
    let title = item
        .title
        .ok_or_else(|| RemoteError::rejected(endpoint, "items[0] has no title"))?;
    let is_generated = item
        .is_generated
        .ok_or_else(|| RemoteError::rejected(endpoint, "items[0] has no is_generated"))?;

    Ok(ClipHandle {
        id,
        title,
        is_generated,
        is_error: item.is_error.unwrap_or(false),
        download_url: item.download_url.filter(|url| !url.is_empty()),
    })
}

/// Decode a `clips.delete` envelope into its status description.
pub fn decode_deletion(body: &[u8]) -> Result<String> {
    let envelope = open_envelope(Endpoint::DeleteClip, body)?;
    Ok(envelope.status_description.unwrap_or_default())
}

fn open_envelope(endpoint: Endpoint, body: &[u8]) -> Result<ClipEnvelope> {
    let envelope: ClipEnvelope = serde_json::from_slice(body)
        .map_err(|e| RemoteError::rejected(endpoint, format!("malformed response: {e}")))?;

    match envelope.status {
        Some(0) => Ok(envelope),
        Some(status) => Err(RemoteError::rejected(
            endpoint,
            format!(
                "status {status}: {} {}",
                envelope.status_description.as_deref().unwrap_or(""),
                envelope.status_detail.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string(),
        )),
        None => Err(RemoteError::rejected(endpoint, "response has no status")),
    }
}
