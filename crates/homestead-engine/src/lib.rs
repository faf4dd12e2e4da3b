//! Homestead Engine - headless host for the Homestead gameplay core.
//!
//! This crate loads configuration and the item catalog from disk, builds a
//! [`homestead_gameplay::GameSession`] and replays scripted input through it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod host;
pub mod item_loader;
pub mod script;

pub use config::EngineConfig;
pub use host::{run_headless, HeadlessRun};
pub use item_loader::{ItemLoadError, ItemLoader, ItemLoaderStats};
pub use script::{DeviceInput, EventLogger, ReplayReport, Script, ScriptError, ScriptRunner};
