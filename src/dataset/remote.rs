//! Decoding of the pre-built dataset served by the cache server.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::{debug, instrument};

use super::{Dataset, DatasetError, RawUserAgent, normalize};

/// The legacy cache server layout: agents grouped by browser, plus a
/// `randomize` table holding one entry per tenth of a percent of usage.
#[derive(Debug, Deserialize)]
struct LegacyPayload {
    browsers: BTreeMap<String, Vec<String>>,
    randomize: BTreeMap<String, String>,
}

/// Decodes a cache server response into a dataset.
///
/// The format is detected from the content: a single JSON object with a
/// `browsers` key is the legacy layout, anything else is read as JSON Lines
/// in the record schema.
///
/// # Errors
///
/// - [`DatasetError::InvalidLegacyPayload`] when a legacy object is malformed
///   or has empty `browsers`/`randomize` tables
/// - JSON Lines decode errors from [`Dataset::from_jsonl_str`]
#[instrument(skip(body), fields(bytes = body.len()))]
pub fn decode_remote_payload(body: &[u8]) -> Result<Dataset, DatasetError> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim().trim_start_matches('\u{feff}');

    if let Ok(serde_json::Value::Object(object)) = serde_json::from_str::<serde_json::Value>(trimmed)
        && object.contains_key("browsers")
    {
        debug!("decoding legacy cache payload");
        let payload: LegacyPayload = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| DatasetError::legacy(e.to_string()))?;
        return decode_legacy(payload);
    }

    Dataset::from_jsonl_str(trimmed)
}

fn decode_legacy(payload: LegacyPayload) -> Result<Dataset, DatasetError> {
    if payload.browsers.is_empty() {
        return Err(DatasetError::legacy("`browsers` table is empty"));
    }
    if payload.randomize.is_empty() {
        return Err(DatasetError::legacy("`randomize` table is empty"));
    }

    let mut shares: HashMap<&str, u32> = HashMap::new();
    for browser in payload.randomize.values() {
        *shares.entry(browser.as_str()).or_default() += 1;
    }

    let raw: Vec<RawUserAgent> = payload
        .browsers
        .iter()
        .flat_map(|(browser, agents)| {
            let percent = f64::from(shares.get(browser.as_str()).copied().unwrap_or(0)) / 10.0;
            agents
                .iter()
                .map(move |agent| RawUserAgent::new(agent.clone(), percent))
        })
        .collect();

    Ok(Dataset::from_records(normalize(raw)))
}
