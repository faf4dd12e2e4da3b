//! Engine configuration.
//!
//! Provides the inventory, build area and asset settings the headless host
//! builds a session from. Configuration can be loaded from and saved to a file.

use glam::Vec2;
use homestead_gameplay::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "homestead.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Inventory Settings ===
    /// Player inventory slots
    pub player_capacity: usize,
    /// Slots in each chest
    pub chest_capacity: usize,
    /// Inventory menu columns
    pub menu_columns: usize,

    // === Build Area Settings ===
    /// World position of the top-left corner of the buildable area
    pub grid_origin: [f32; 2],
    /// Buildable area rows
    pub grid_rows: usize,
    /// Buildable area columns
    pub grid_cols: usize,
    /// Cell size in world units
    pub grid_cell_size: f32,

    // === Assets ===
    /// Item catalog file or directory of catalog files
    pub catalog_path: PathBuf,
    /// Intent script replayed by the headless driver
    pub script_path: Option<PathBuf>,

    // === Diagnostics ===
    /// Tracing filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Event bus capacity per tick
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            // Inventory
            player_capacity: session.player_capacity,
            chest_capacity: session.chest_capacity,
            menu_columns: session.menu_columns,

            // Build area
            grid_origin: session.grid_origin.to_array(),
            grid_rows: session.grid_rows,
            grid_cols: session.grid_cols,
            grid_cell_size: session.grid_cell_size,

            // Assets
            catalog_path: PathBuf::from(crate::item_loader::DEFAULT_CATALOG_PATH),
            script_path: None,

            // Diagnostics
            log_filter: "homestead=info".to_string(),
            log_json: false,
            event_capacity: session.event_capacity,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `homestead.toml` in the working directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        info!("Loaded config from {}", path.display());
                        config.validate();
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Inventories
        self.player_capacity = self.player_capacity.clamp(1, 100);
        self.chest_capacity = self.chest_capacity.clamp(1, 100);
        self.menu_columns = self.menu_columns.clamp(1, 20);

        // Build area
        self.grid_rows = self.grid_rows.clamp(1, 256);
        self.grid_cols = self.grid_cols.clamp(1, 256);
        if !self.grid_cell_size.is_finite() || self.grid_cell_size <= 0.0 {
            warn!("Invalid grid cell size {}, using 1.0", self.grid_cell_size);
            self.grid_cell_size = 1.0;
        }
        self.grid_cell_size = self.grid_cell_size.clamp(0.05, 16.0);

        // Diagnostics
        self.event_capacity = self.event_capacity.clamp(16, 65_536);
        if self.log_filter.trim().is_empty() {
            self.log_filter = "homestead=info".to_string();
        }
    }

    /// Settings for a gameplay session.
    #[must_use]
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            player_capacity: self.player_capacity,
            chest_capacity: self.chest_capacity,
            menu_columns: self.menu_columns,
            grid_origin: Vec2::from_array(self.grid_origin),
            grid_rows: self.grid_rows,
            grid_cols: self.grid_cols,
            grid_cell_size: self.grid_cell_size,
            event_capacity: self.event_capacity,
        }
    }
}
