use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, VidsplitError};

use super::MediaEngine;

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Get the container duration of `path` in seconds.
pub async fn probe_duration(engine: &dyn MediaEngine, path: &Path) -> Result<f64> {
    let document = engine.probe(path).await.map_err(|e| VidsplitError::Probe {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let duration = parse_duration(&document).map_err(|reason| VidsplitError::Probe {
        path: path.display().to_string(),
        reason,
    })?;

    debug!("{} duration: {:.3}s", path.display(), duration);
    Ok(duration)
}

/// Extract `format.duration` from a probe document.
pub fn parse_duration(document: &str) -> std::result::Result<f64, String> {
    if document.trim().is_empty() {
        return Err("empty probe result".to_string());
    }

    let parsed: ProbeDocument = serde_json::from_str(document)
        .map_err(|e| format!("failed to parse probe data: {e}"))?;

    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| "probe data has no format.duration".to_string())?;

    let duration: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("failed to parse duration '{raw}': {e}"))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(format!("unusable duration '{raw}'"));
    }

    Ok(duration)
}
