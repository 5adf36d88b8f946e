use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use raidbot_common::models::RaidConfig;
use raidbot_core::auth::TokenStore;
use raidbot_core::platforms::SceneBackend;
use raidbot_core::platforms::twitch::{HelixMetadataResolver, TwitchHelixClient};
use raidbot_core::platforms::twitch::requests::user::get_authenticated_user;
use raidbot_core::platforms::twitch_eventsub::ModerationEventSub;
use raidbot_core::services::{
    FileArtifactWriter, LifecycleEvent, LifecycleOutcome, LifecycleSupervisor, RaidSequencer,
    SceneController, SceneMode, ShutdownCode,
};
use raidbot_core::Error;
use raidbot_obs::ObsClient;

#[derive(Parser, Debug, Clone)]
#[command(name = "raidbot")]
#[command(author, version, about = "Raidbot - shows who you are raiding in OBS")]
struct Args {
    /// Path to config.json
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Path to the Twitch token file; rewritten on every refresh
    #[arg(long, default_value = "tokens.json")]
    tokens: PathBuf,

    /// Directory for raid.txt / raid_game.txt / raid_pfp.png (overrides outputDir)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("raidbot=info,raidbot_core=info,raidbot_obs=info"));
    fmt().with_env_filter(filter).init();
}

fn load_config(args: &Args) -> Result<RaidConfig, Error> {
    let mut config = RaidConfig::from_path(&args.config)?;
    config.apply_env_overrides();
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("Starting..");

    let config = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            std::process::exit(ShutdownCode::ConnectionError.code());
        }
    };

    let code = run(args, config).await?;
    info!("Goodbye!");
    std::process::exit(code.code());
}

async fn run(args: Args, config: RaidConfig) -> anyhow::Result<ShutdownCode> {
    let obs = Arc::new(ObsClient::new(config.obs_instance()?));
    let backend: Arc<dyn SceneBackend> = obs.clone();
    let scene = Arc::new(SceneController::new(
        backend.clone(),
        SceneMode::from_config(&config),
        config.settle_delay(),
    ));
    let supervisor = LifecycleSupervisor::new(scene.clone(), backend);

    // 1) OBS session
    if let Err(e) = obs.connect().await {
        let outcome = supervisor.handle(LifecycleEvent::ConnectionFailed(e.to_string())).await;
        return Ok(exit_code(outcome));
    }

    let (lifecycle_tx, lifecycle_rx) = mpsc::channel::<LifecycleEvent>(16);

    let mut obs_events = match obs.lifecycle_events().await {
        Ok(rx) => rx,
        Err(e) => {
            let outcome = supervisor.handle(LifecycleEvent::ConnectionFailed(e.to_string())).await;
            return Ok(exit_code(outcome));
        }
    };
    let obs_tx = lifecycle_tx.clone();
    tokio::spawn(async move {
        while let Some(evt) = obs_events.recv().await {
            if obs_tx.send(evt.into()).await.is_err() {
                break;
            }
        }
    });

    let ctrlc_tx = lifecycle_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
            return;
        }
        let _ = ctrlc_tx.send(LifecycleEvent::Interrupt).await;
    });

    // 2) Twitch: token, broadcaster identity, moderation feed
    if let Err(e) = start_twitch(&args, &config, scene).await {
        error!("Twitch setup failed: {}", e);
        let outcome = supervisor.shutdown(ShutdownCode::ConnectionError).await;
        return Ok(exit_code(outcome));
    }

    // 3) Block until something ends the session
    drop(lifecycle_tx);
    Ok(supervisor.run(lifecycle_rx).await)
}

async fn start_twitch(args: &Args, config: &RaidConfig, scene: Arc<SceneController>) -> Result<(), Error> {
    let tokens = Arc::new(TokenStore::load(&args.tokens, &config.client_id, &config.client_secret).await?);
    let helix = Arc::new(TwitchHelixClient::new(tokens));

    let me = get_authenticated_user(&helix).await?;
    info!("Authenticated to Twitch as {} ({})", me.login, me.id);

    let (actions_tx, actions_rx) = mpsc::channel(64);
    let eventsub = ModerationEventSub::new(helix.clone(), me.id, actions_tx);
    tokio::spawn(async move {
        if let Err(e) = eventsub.start_loop().await {
            error!("Moderation feed stopped: {}", e);
        }
    });

    let sequencer = RaidSequencer::new(
        Arc::new(HelixMetadataResolver::new(helix)),
        Arc::new(FileArtifactWriter::new(config.output_dir.clone())),
        scene,
        config.display_options(),
    );
    tokio::spawn(sequencer.run(actions_rx));
    Ok(())
}

fn exit_code(outcome: LifecycleOutcome) -> ShutdownCode {
    match outcome {
        LifecycleOutcome::Exit(code) => code,
        _ => ShutdownCode::Clean,
    }
}
