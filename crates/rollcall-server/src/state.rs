//! Application state shared across handlers.

use std::sync::Arc;

use chrono_tz::Tz;
use rollcall_core::{AdmissionService, MemoryDirectory, RollcallConfig};

/// Shared application state, cheap to clone into handlers.
pub type SharedState = Arc<AppState>;

/// State owned by the server for its whole lifetime.
///
/// The admission service is internally synchronized, so no outer lock is
/// needed; configuration is read-only after startup.
pub struct AppState {
    /// The attendance admission service.
    pub admissions: AdmissionService,

    /// The directory backend, kept around for seeding and administration.
    pub directory: Arc<MemoryDirectory>,

    /// Loaded configuration.
    pub config: RollcallConfig,
}

impl AppState {
    /// Create state from configuration, loading the directory snapshot from
    /// the configured data directory.
    pub fn new(config: RollcallConfig) -> anyhow::Result<SharedState> {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => rollcall_core::default_data_dir()?,
        };
        let directory = Arc::new(MemoryDirectory::with_snapshot(
            config.timezone,
            data_dir.join("directory.json"),
        )?);
        Ok(Self::with_directory(config, directory))
    }

    /// Create state around an existing directory. Used by tests and by
    /// `new` after the snapshot is loaded.
    pub fn with_directory(config: RollcallConfig, directory: Arc<MemoryDirectory>) -> SharedState {
        let timezone: Tz = config.timezone;
        let admissions = AdmissionService::new(
            directory.clone(),
            directory.clone(),
            timezone,
            config.broadcast_ttl(),
        );
        Arc::new(AppState {
            admissions,
            directory,
            config,
        })
    }
}
