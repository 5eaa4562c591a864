use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use salewatch_core::{SaleEvent, SaleVerdict};

use crate::error::StateError;
use crate::record::{PersistedState, StoreRecord};

/// What a verdict did to a store's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The sale just started (or restarted after ending); notify about it.
    NewSale(SaleEvent),
    /// Already known to be on sale; record refreshed, nothing to send.
    Ongoing,
    /// The store was on sale and no longer is.
    Ended,
    /// The page could not be checked; the record is left untouched.
    Unknown,
    NoSale,
}

/// Owns the persisted state for one run: load at start, apply verdicts,
/// save at the end.
#[derive(Debug)]
pub struct SaleStateStore {
    path: PathBuf,
    state: PersistedState,
}

impl SaleStateStore {
    /// Loads the state file at `path`.
    ///
    /// A missing file starts empty. A file that is not UTF-8 JSON of the
    /// expected shape also starts empty: it is copied to `<path>.corrupt`
    /// first so the next save does not destroy it.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Read`] if the file exists but cannot be read.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no state file yet — starting empty");
            return Ok(Self::empty(path));
        }

        let bytes = std::fs::read(&path).map_err(|source| StateError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let parsed = String::from_utf8(bytes)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_json::from_str::<PersistedState>(&contents).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(state) => {
                tracing::debug!(
                    path = %path.display(),
                    stores = state.sales.len(),
                    "loaded sale state"
                );
                Ok(Self { path, state })
            }
            Err(reason) => {
                let backup = sibling_with_suffix(&path, ".corrupt");
                tracing::warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %reason,
                    "state file is corrupt — starting with empty state"
                );
                if let Err(copy_err) = std::fs::copy(&path, &backup) {
                    tracing::warn!(
                        backup = %backup.display(),
                        error = %copy_err,
                        "could not back up corrupt state file"
                    );
                }
                Ok(Self::empty(path))
            }
        }
    }

    /// An empty store that will save to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: PersistedState::default(),
        }
    }

    #[must_use]
    pub fn get(&self, store_name: &str) -> Option<&StoreRecord> {
        self.state.sales.get(store_name)
    }

    /// `true` when `verdict` is active and the store has no record or its
    /// record is not active.
    #[must_use]
    pub fn classify(&self, store_name: &str, verdict: &SaleVerdict) -> bool {
        verdict.is_active && !self.get(store_name).is_some_and(|r| r.active)
    }

    pub fn record(&mut self, store_name: &str, verdict: &SaleVerdict) {
        self.record_at(store_name, verdict, Utc::now());
    }

    /// Upserts the store as active with the verdict's details. `first_seen`
    /// is kept from an existing record.
    pub fn record_at(&mut self, store_name: &str, verdict: &SaleVerdict, now: DateTime<Utc>) {
        let record = self.state.sales.entry(store_name.to_string()).or_default();
        record.active = true;
        record.description.clone_from(&verdict.description);
        record.url.clone_from(&verdict.evidence_url);
        record.item_count = verdict.item_count;
        record.discount_percent = verdict.discount_percent;
        record.first_seen.get_or_insert(now);
        record.last_seen = Some(now);
        record.ended = None;
    }

    pub fn mark_inactive(&mut self, store_name: &str) {
        self.mark_inactive_at(store_name, Utc::now());
    }

    /// Marks an existing record as ended. No-op for unknown stores.
    pub fn mark_inactive_at(&mut self, store_name: &str, now: DateTime<Utc>) {
        if let Some(record) = self.state.sales.get_mut(store_name) {
            record.active = false;
            record.ended = Some(now);
        }
    }

    pub fn observe(&mut self, verdict: &SaleVerdict) -> Observation {
        self.observe_at(verdict, Utc::now())
    }

    /// Applies one verdict to the state.
    ///
    /// An errored verdict never ends a sale: a flaky fetch must not produce
    /// a duplicate notification on the next successful check.
    pub fn observe_at(&mut self, verdict: &SaleVerdict, now: DateTime<Utc>) -> Observation {
        let name = verdict.store_name.as_str();

        if verdict.is_active {
            let is_new = self.classify(name, verdict);
            self.record_at(name, verdict, now);
            if is_new {
                tracing::info!(store = name, description = %verdict.description, "new sale");
                return Observation::NewSale(verdict.to_event());
            }
            return Observation::Ongoing;
        }

        if verdict.is_unknown() {
            return Observation::Unknown;
        }

        if self.get(name).is_some_and(|r| r.active) {
            self.mark_inactive_at(name, now);
            tracing::info!(store = name, "sale ended");
            return Observation::Ended;
        }

        Observation::NoSale
    }

    /// Stores currently believed to be on sale, by name.
    pub fn active_sales(&self) -> impl Iterator<Item = (&str, &StoreRecord)> {
        self.state
            .sales
            .iter()
            .filter(|(_, r)| r.active)
            .map(|(name, r)| (name.as_str(), r))
    }

    /// Stamps `last_check` and writes the state file.
    ///
    /// # Errors
    ///
    /// See [`SaleStateStore::save_at`].
    pub fn save(&mut self) -> Result<(), StateError> {
        self.save_at(Utc::now())
    }

    /// Writes pretty JSON to a `.tmp` sibling and renames it over the state
    /// file, so an interrupted save leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Write`] on any filesystem failure.
    pub fn save_at(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        self.state.last_check = Some(now);
        let json = serde_json::to_string_pretty(&self.state)?;

        let write_err = |source| StateError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = sibling_with_suffix(&self.path, ".tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        tracing::debug!(
            path = %self.path.display(),
            stores = self.state.sales.len(),
            "saved sale state"
        );
        Ok(())
    }
}

/// `sale_state.json` → `sale_state.json.corrupt`.
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
