//! Memoization of whole runs, keyed by a structural hash of the inputs.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::DispatchResult;

use super::engine::simulate;
use super::types::{DispatchConfig, HourlyRecord, Profiles};

#[derive(Serialize)]
struct RunInputs<'a> {
    config: &'a DispatchConfig,
    horizon: usize,
    load_mw: &'a [f64],
    solar_mw: &'a [f64],
}

/// SHA-256 over the JSON form of everything a run depends on.
///
/// Only the first `horizon` profile values take part, since the engine
/// never reads past them. Returns `None` when the inputs cannot be
/// serialized (non-finite profile values).
pub fn run_key(config: &DispatchConfig, profiles: &Profiles, horizon: usize) -> Option<String> {
    let inputs = RunInputs {
        config,
        horizon,
        load_mw: &profiles.load_mw[..horizon.min(profiles.load_mw.len())],
        solar_mw: &profiles.solar_mw[..horizon.min(profiles.solar_mw.len())],
    };
    if inputs
        .load_mw
        .iter()
        .chain(inputs.solar_mw)
        .any(|v| !v.is_finite())
    {
        return None;
    }
    let json = serde_json::to_string(&inputs).ok()?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Some(format!("{:x}", hasher.finalize()))
}

/// Caller-owned cache of complete record sequences.
///
/// The engine knows nothing about it; callers that re-run identical
/// scenarios route through [`RunCache::get_or_run`]. Failed runs are not
/// cached.
#[derive(Debug, Default)]
pub struct RunCache {
    entries: HashMap<String, Arc<Vec<HourlyRecord>>>,
    hits: usize,
    misses: usize,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached records for these inputs, simulating on a miss.
    pub fn get_or_run(
        &mut self,
        config: &DispatchConfig,
        profiles: &Profiles,
        horizon: usize,
    ) -> DispatchResult<Arc<Vec<HourlyRecord>>> {
        let Some(key) = run_key(config, profiles, horizon) else {
            debug!("run inputs not hashable, bypassing cache");
            return simulate(config, profiles, horizon).map(Arc::new);
        };

        if let Some(records) = self.entries.get(&key) {
            self.hits += 1;
            debug!(key = %&key[..12], "run cache hit");
            return Ok(Arc::clone(records));
        }

        self.misses += 1;
        debug!(key = %&key[..12], "run cache miss");
        let records = Arc::new(simulate(config, profiles, horizon)?);
        self.entries.insert(key, Arc::clone(&records));
        Ok(records)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
