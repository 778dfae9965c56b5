//! Tank Battle entry point
//!
//! ```text
//! tankbattle [server|client|demo|tutorial] [--config settings.json]
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tankbattle::assets::{AssetKey, AssetRegistry};
use tankbattle::bot::BotDriver;
use tankbattle::engine::{Engine, EngineHandle};
use tankbattle::net::{self, Relay};
use tankbattle::settings::GameMode;
use tankbattle::sim::{
    DemoGenerator, MatchGenerator, MatchOutcome, Stage, StageGenerator, TickReport,
    TutorialGenerator,
};
use tankbattle::{NetError, Settings};

const DEFAULT_CONFIG: &str = "tankbattle.json";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut mode = None;
    let mut config = DEFAULT_CONFIG.to_string();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(path) => config = path,
                None => {
                    log::error!("--config needs a path");
                    return ExitCode::FAILURE;
                }
            },
            other => match GameMode::from_str(other) {
                Some(m) => mode = Some(m),
                None => {
                    log::error!("unknown argument `{other}`");
                    return ExitCode::FAILURE;
                }
            },
        }
    }

    let mut settings = Settings::load_or_default(&config);
    if let Some(mode) = mode {
        settings.mode = mode;
    }
    log::info!("Tank Battle starting in {} mode", settings.mode.as_str());

    let assets = match settings.assets_dir.as_deref().map(AssetRegistry::load) {
        Some(Ok(registry)) => Some(registry),
        Some(Err(e)) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
        None => None,
    };

    let result = match settings.mode {
        GameMode::Server => run_server(&settings).await,
        GameMode::Client => run_client(&settings, assets).await,
        GameMode::Demo => run_local(&settings, &DemoGenerator, assets).await,
        GameMode::Tutorial => run_local(&settings, &TutorialGenerator, assets).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_server(settings: &Settings) -> Result<(), NetError> {
    let relay = Relay::bind(&settings.server_addr, settings.max_connections).await?;
    tokio::select! {
        result = relay.run() => result,
        _ = tokio::signal::ctrl_c() => {
            log::info!("relay shutting down");
            Ok(())
        }
    }
}

async fn run_client(settings: &Settings, assets: Option<AssetRegistry>) -> Result<(), NetError> {
    let connection = net::connect(&settings.server_addr, &settings.player_name).await?;
    let generator = MatchGenerator {
        tanks_per_team: settings.tanks_per_team,
    };
    // Peers share a generator, so ids line up without exchanging the layout
    let (stage, layout) = Stage::with_generator(&generator, settings.effective_seed());
    let stage = Arc::new(stage);
    let local = layout.tank_for_client(connection.client_number());

    let (sender, receiver) = connection.start(Arc::clone(&stage), local);
    let mut engine = Engine::new(Arc::clone(&stage), settings.tick_rate);
    engine.add_hook(
        BotDriver::new(local, settings.effective_seed()).with_outbox(move |command| {
            if sender.send(*command).is_err() {
                log::debug!("connection gone, `{command}` not sent");
            }
        }),
    );
    engine.add_hook(presentation_hook(assets));

    let handle = engine.spawn()?;
    supervise(handle, &stage, Some(receiver)).await;
    Ok(())
}

async fn run_local(
    settings: &Settings,
    generator: &dyn StageGenerator,
    assets: Option<AssetRegistry>,
) -> Result<(), NetError> {
    let seed = settings.effective_seed();
    let (stage, layout) = Stage::with_generator(generator, seed);
    let stage = Arc::new(stage);

    let mut engine = Engine::new(Arc::clone(&stage), settings.tick_rate);
    if settings.demo_ticks > 0 {
        engine = engine.with_max_ticks(settings.demo_ticks);
    }
    engine.add_hook(BotDriver::new(layout.tanks.iter().copied(), seed));
    engine.add_hook(presentation_hook(assets));

    let handle = engine.spawn()?;
    supervise(handle, &stage, None).await;
    Ok(())
}

/// Stand-in for the renderer and audio: reports cues and the final result
fn presentation_hook(
    assets: Option<AssetRegistry>,
) -> impl FnMut(&Stage, &TickReport) + Send + 'static {
    let mut announced = false;
    move |stage: &Stage, report: &TickReport| {
        for event in stage.drain_cues() {
            let sound = AssetKey::for_cue(event.cue);
            let bytes = assets.as_ref().map_or(0, |a| a.get(sound).len());
            log::debug!(
                "tick {}: {:?} from {} at {} ({}, {bytes} bytes)",
                report.tick,
                event.cue,
                event.source,
                event.position,
                sound.file_name()
            );
        }
        if report.failures > 0 {
            log::warn!("tick {}: {} entity callbacks failed", report.tick, report.failures);
        }
        if !announced {
            match stage.outcome() {
                MatchOutcome::InProgress => {}
                MatchOutcome::Winner(team) => {
                    log::info!("{} wins at tick {}", team.as_str(), report.tick);
                    announced = true;
                }
                MatchOutcome::Draw => {
                    log::info!("draw at tick {}", report.tick);
                    announced = true;
                }
            }
        }
    }
}

/// Wait for the engine to finish, the match to end, or Ctrl-C
async fn supervise(
    handle: EngineHandle,
    stage: &Stage,
    receiver: Option<tokio::task::JoinHandle<u64>>,
) {
    let mut poll = tokio::time::interval(Duration::from_millis(100));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                break;
            }
            _ = poll.tick() => {
                if !handle.is_running() || stage.outcome() != MatchOutcome::InProgress {
                    break;
                }
            }
        }
    }
    let ticks = handle.stop();
    if let Some(receiver) = receiver {
        receiver.abort();
    }
    log::info!(
        "finished after {ticks} ticks; red base {:?}, blue base {:?}",
        stage.base_hp(tankbattle::sim::Team::Red),
        stage.base_hp(tankbattle::sim::Team::Blue)
    );
}
