//! Application state shared across handlers.

use std::sync::{Arc, Mutex};

use crate::config::Settings;
use crate::db::DbPool;
use crate::library::ScanStats;

/// Outcome of the most recent reconciliation pass. Owned here by the web
/// layer; the scan core itself keeps nothing between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanMeta {
    pub has_scanned: bool,
    pub stats: Option<ScanStats>,
}

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared catalog connection
    pub pool: DbPool,

    pub settings: Arc<Settings>,

    scan_meta: Arc<Mutex<ScanMeta>>,
}

impl AppState {
    pub fn new(pool: DbPool, settings: Settings) -> Self {
        Self {
            pool,
            settings: Arc::new(settings),
            scan_meta: Arc::new(Mutex::new(ScanMeta::default())),
        }
    }

    /// Record the stats of a finished pass.
    pub fn set_scan_meta(&self, stats: ScanStats) {
        if let Ok(mut meta) = self.scan_meta.lock() {
            meta.has_scanned = true;
            meta.stats = Some(stats);
        }
    }

    pub fn scan_meta(&self) -> ScanMeta {
        self.scan_meta.lock().map(|meta| *meta).unwrap_or_default()
    }
}
