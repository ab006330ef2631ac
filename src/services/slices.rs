//! Read-only data slices populated by the host.
//!
//! The host fetches GitHub data and places it into a [`SliceStore`];
//! panels hold a [`SliceReader`] and only ever read. Slice data is
//! replaced wholesale between renders; consumers never assume partial
//! mutation. `data == None` while `loading` is the authoritative
//! "nothing to show yet" state, and a set `error` is terminal for the
//! attempt until the user triggers a refresh.

use crate::error::PanelError;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Well-known slice names.
pub mod names {
    pub const GITHUB_ISSUES: &str = "github-issues";
    pub const GITHUB_MESSAGES: &str = "github-messages";
    pub const OWNER_REPOSITORIES: &str = "owner-repositories";
    pub const GITHUB_REPOSITORIES: &str = "github-repositories";
    pub const WORKSPACE: &str = "workspace";
    pub const WORKSPACE_REPOSITORIES: &str = "workspaceRepositories";
}

/// Scope a slice is keyed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceScope {
    Global,
    Repository,
}

/// A typed, read-only view of one slice at one point in time.
#[derive(Debug, Clone)]
pub struct DataSlice<T> {
    pub scope: SliceScope,
    pub name: String,

    /// The fetched data, if any. Replaced wholesale by the host.
    pub data: Option<T>,

    /// Whether a fetch/refresh is outstanding.
    pub loading: bool,

    /// Terminal error of the last attempt, displayed verbatim.
    pub error: Option<String>,
}

impl<T> DataSlice<T> {
    /// The "nothing to show yet" state.
    pub fn is_pending(&self) -> bool {
        self.data.is_none() && self.loading
    }
}

/// Host-injected fetch function for one slice.
pub type Refresher =
    dyn Fn() -> BoxFuture<'static, Result<serde_json::Value, PanelError>> + Send + Sync;

struct SliceEntry {
    scope: SliceScope,
    data: Option<serde_json::Value>,
    loading: bool,
    error: Option<String>,
    refresher: Option<Arc<Refresher>>,
    in_flight: Arc<AtomicBool>,
}

type SliceMap = Arc<RwLock<HashMap<String, SliceEntry>>>;

fn read(map: &SliceMap) -> std::sync::RwLockReadGuard<'_, HashMap<String, SliceEntry>> {
    map.read().unwrap_or_else(|e| e.into_inner())
}

fn write(map: &SliceMap) -> std::sync::RwLockWriteGuard<'_, HashMap<String, SliceEntry>> {
    map.write().unwrap_or_else(|e| e.into_inner())
}

/// Host-owned slice map. Panels never hold this directly; they get a
/// [`SliceReader`] via [`SliceStore::reader`].
#[derive(Clone, Default)]
pub struct SliceStore {
    inner: SliceMap,
}

impl SliceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slice, optionally with a refresher the reader side can
    /// invoke. Registering twice replaces the refresher but keeps data.
    pub fn register(
        &self,
        name: impl Into<String>,
        scope: SliceScope,
        refresher: Option<Arc<Refresher>>,
    ) {
        let name = name.into();
        let mut map = write(&self.inner);
        match map.get_mut(&name) {
            Some(entry) => {
                entry.scope = scope;
                entry.refresher = refresher;
            }
            None => {
                map.insert(
                    name,
                    SliceEntry {
                        scope,
                        data: None,
                        loading: false,
                        error: None,
                        refresher,
                        in_flight: Arc::new(AtomicBool::new(false)),
                    },
                );
            }
        }
    }

    /// Mark a slice as loading (host fetch started).
    pub fn begin_loading(&self, name: &str) {
        if let Some(entry) = write(&self.inner).get_mut(name) {
            entry.loading = true;
        }
    }

    /// Replace a slice's data wholesale, clearing loading and error.
    pub fn set_data(&self, name: &str, data: serde_json::Value) {
        if let Some(entry) = write(&self.inner).get_mut(name) {
            entry.data = Some(data);
            entry.loading = false;
            entry.error = None;
        }
    }

    /// Record a terminal fetch error, clearing loading.
    pub fn set_error(&self, name: &str, message: impl Into<String>) {
        if let Some(entry) = write(&self.inner).get_mut(name) {
            entry.loading = false;
            entry.error = Some(message.into());
        }
    }

    /// A read-only handle sharing this store's slice map.
    pub fn reader(&self) -> SliceReader {
        SliceReader {
            inner: self.inner.clone(),
        }
    }
}

/// Read-only slice access handed to panels.
#[derive(Clone)]
pub struct SliceReader {
    inner: SliceMap,
}

impl SliceReader {
    /// Snapshot one slice, deserializing its data to `T`.
    ///
    /// Data the host placed that does not match `T` is reported through
    /// the slice's error field rather than panicking or blanking other
    /// slices.
    pub fn get_slice<T: DeserializeOwned>(&self, name: &str) -> Option<DataSlice<T>> {
        let map = read(&self.inner);
        let entry = map.get(name)?;

        let (data, mut error) = match &entry.data {
            Some(value) => match serde_json::from_value::<T>(value.clone()) {
                Ok(parsed) => (Some(parsed), None),
                Err(err) => {
                    log::warn!("slice {} holds malformed data: {}", name, err);
                    (None, Some(format!("malformed slice data: {}", err)))
                }
            },
            None => (None, None),
        };
        if error.is_none() {
            error = entry.error.clone();
        }

        Some(DataSlice {
            scope: entry.scope,
            name: name.to_string(),
            data,
            loading: entry.loading,
            error,
        })
    }

    /// Whether the slice exists at all.
    pub fn has_slice(&self, name: &str) -> bool {
        read(&self.inner).contains_key(name)
    }

    /// Whether the slice exists and is currently loading.
    pub fn is_slice_loading(&self, name: &str) -> bool {
        read(&self.inner).get(name).is_some_and(|e| e.loading)
    }

    /// Re-run the slice's refresher.
    ///
    /// One refresh per slice is in flight at a time; calls made while a
    /// previous one is outstanding return immediately. Fetch failures are
    /// recorded on the slice (terminal until the next user-triggered
    /// refresh) and also returned for logging.
    pub async fn refresh(&self, name: &str) -> Result<(), PanelError> {
        let (refresher, in_flight) = {
            let map = read(&self.inner);
            let entry = map.get(name).ok_or_else(|| {
                PanelError::data_fetch_for_slice("unknown slice", name)
            })?;
            let refresher = entry.refresher.clone().ok_or_else(|| {
                PanelError::data_fetch_for_slice("slice has no refresher", name)
            })?;
            (refresher, entry.in_flight.clone())
        };

        if in_flight.swap(true, Ordering::SeqCst) {
            // A refresh is already outstanding; do not duplicate the
            // external call.
            return Ok(());
        }

        if let Some(entry) = write(&self.inner).get_mut(name) {
            entry.loading = true;
        }

        let result = refresher().await;

        {
            let mut map = write(&self.inner);
            if let Some(entry) = map.get_mut(name) {
                match &result {
                    Ok(value) => {
                        entry.data = Some(value.clone());
                        entry.error = None;
                    }
                    Err(err) => {
                        entry.error = Some(err.to_string());
                    }
                }
                entry.loading = false;
            }
        }
        in_flight.store(false, Ordering::SeqCst);

        result.map(|_| ())
    }
}
