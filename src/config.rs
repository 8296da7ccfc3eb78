//! Centralized configuration for dbfgrid.
//!
//! Goals:
//! - Single place for tunables instead of scattering env lookups.
//! - GridConfig::from_env() reads DBFGRID_* variables; fluent with_* setters
//!   override individual fields.
//!
//! Performance-oriented defaults:
//! - prefetch = 255 (live rows per fetch_next_batch call; bounds the tail
//!   latency of one call at 255 sequential record reads)
//! - sync_on_persist = false (persisted records are flushed to the OS, not
//!   fsynced; flip on when every cell edit must hit the platter)

/// Tunables for the table layer and the paged model.
#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Live records materialized by one fetch_next_batch call.
    /// Env: DBFGRID_PREFETCH (default 255). A value of 0 is clamped to 1.
    pub prefetch: usize,

    /// fsync the table file after every persisted record.
    /// Env: DBFGRID_SYNC_ON_PERSIST (default false; "1|true|on|yes" => true)
    pub sync_on_persist: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            prefetch: crate::consts::DEFAULT_PREFETCH,
            sync_on_persist: false,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("DBFGRID_PREFETCH") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.prefetch = n.max(1);
            }
        }

        if let Ok(v) = std::env::var("DBFGRID_SYNC_ON_PERSIST") {
            let s = v.trim().to_ascii_lowercase();
            cfg.sync_on_persist = s == "1" || s == "true" || s == "on" || s == "yes";
        }

        cfg
    }

    pub fn with_prefetch(mut self, n: usize) -> Self {
        self.prefetch = n.max(1);
        self
    }

    pub fn with_sync_on_persist(mut self, on: bool) -> Self {
        self.sync_on_persist = on;
        self
    }
}
