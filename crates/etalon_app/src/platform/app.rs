use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use etalon_core::{update, AppState, AppViewModel, Msg};
use etalon_engine::EngineConfig;
use rig_logging::rig_info;

use super::console;
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};

/// Command-line surface of the operator console.
#[derive(Parser, Debug)]
#[command(name = "etalon", about = "Operator console for the continuity test rig", version)]
pub struct ConsoleArgs {
    /// Base URL of the device API.
    #[arg(long, env = "ETALON_DEVICE_URL", default_value = "http://192.168.4.1")]
    pub device_url: String,

    /// Directory downloaded reference artifacts are saved into.
    #[arg(long, default_value = "downloads")]
    pub download_dir: PathBuf,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Whole-request timeout in seconds. Requests wait indefinitely without it.
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Default)]
pub struct SharedState {
    pub state: AppState,
}

pub fn run_app() -> anyhow::Result<()> {
    let args = ConsoleArgs::parse();
    logging::initialize(args.log);
    rig_info!("etalon console starting against {}", args.device_url);

    let shared = Arc::new(Mutex::new(SharedState::default()));
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

    let mut config = EngineConfig::default_with_download_dir(args.download_dir.clone());
    config.settings.base_url = args.device_url.clone();
    config.settings.request_timeout = args.request_timeout_secs.map(Duration::from_secs);

    let effects = EffectRunner::new(config, msg_tx.clone())?;

    // Initial refresh, as if the list view had just been opened.
    let _ = msg_tx.send(Msg::Started);

    console::run_loop(&args.device_url, &shared, &msg_rx, &msg_tx, &effects)
}

/// Feeds one message through the pure update loop.
///
/// Effects are enqueued after the state lock is released; the returned view
/// is `Some` only when the rendered snapshot changed.
pub fn dispatch_msg(
    shared: &Mutex<SharedState>,
    effects: &EffectRunner,
    msg: Msg,
) -> Option<AppViewModel> {
    let (maybe_view, effect_list) = {
        let mut guard = shared.lock().expect("lock shared state");
        let state = std::mem::take(&mut guard.state);
        let (mut state, effect_list) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        guard.state = state;
        (was_dirty.then_some(view), effect_list)
    };
    effects.enqueue(effect_list);
    maybe_view
}
