//! Headless run: builds a session from configuration and replays the
//! configured script through it.

use homestead_common::HomesteadResult;
use homestead_gameplay::{EventHandler, GameSession};
use tracing::info;

use crate::config::EngineConfig;
use crate::item_loader::{ItemLoader, ItemLoaderStats};
use crate::script::{ReplayReport, Script, ScriptRunner};

/// What a headless run produced.
#[derive(Debug)]
pub struct HeadlessRun {
    /// Session after the last frame
    pub session: GameSession,
    /// Catalog load statistics
    pub catalog: ItemLoaderStats,
    /// Replay outcome, when a script was configured
    pub replay: Option<ReplayReport>,
}

/// Loads the catalog, creates a session and replays `config.script_path`,
/// sending every event to `handler`.
pub fn run_headless(
    config: &EngineConfig,
    handler: &mut dyn EventHandler,
) -> HomesteadResult<HeadlessRun> {
    let (catalog, stats) = ItemLoader::load_path(&config.catalog_path)?;
    let mut session = GameSession::new(catalog, config.to_session_config())?;

    let replay = match &config.script_path {
        Some(path) => {
            let script = Script::load(path)?;
            let report = ScriptRunner::new(&mut session, &script.setup)?
                .run(&script.frames, handler)?;
            Some(report)
        },
        None => {
            info!("No script configured, nothing to replay");
            None
        },
    };

    Ok(HeadlessRun {
        session,
        catalog: stats,
        replay,
    })
}
