use anyhow::{Context, Result};
use clap::Parser;
use sign_translator::{
    Config, LoggingSpeechOutput, PermissionStatus, Phase, SessionController, SimulatedCamera,
    StubRecognizer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Headless run of the sign language translator session
#[derive(Debug, Parser)]
#[command(name = "sign-translator", version)]
struct Args {
    /// Config file path without extension
    #[arg(long, default_value = "config/sign-translator")]
    config: String,

    /// Number of record/translate/speak cycles to run
    #[arg(long, default_value_t = 1)]
    cycles: usize,

    /// Stop each recording manually after this many ms instead of waiting for auto-stop
    #[arg(long)]
    stop_after_ms: Option<u64>,

    /// Start with camera access denied (the first start is rejected, then access is re-requested)
    #[arg(long)]
    deny_camera: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Sign Translator v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Timing: auto-stop {} ms, processing delay {} ms",
        cfg.timing.auto_stop_ms, cfg.timing.processing_delay_ms
    );

    let camera = if args.deny_camera {
        Arc::new(SimulatedCamera::new(PermissionStatus::Denied, true))
    } else {
        Arc::new(SimulatedCamera::granted())
    };
    let recognizer = Arc::new(StubRecognizer::new(
        cfg.recognizer.phrases.clone(),
        cfg.recognizer_latency(),
    ));

    let controller = SessionController::spawn(
        cfg.session_config(),
        camera,
        recognizer,
        Arc::new(LoggingSpeechOutput),
    );

    // Log every published state change
    let mut updates = controller.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            info!(
                "[{:?}] {} (camera={:?})",
                snapshot.phase,
                snapshot
                    .recognized_text
                    .as_deref()
                    .unwrap_or(snapshot.phase.description()),
                snapshot.camera_facing
            );
        }
    });

    for cycle in 1..=args.cycles {
        info!("Cycle {}/{}", cycle, args.cycles);
        run_cycle(&controller, args.stop_after_ms).await?;
    }

    let stats = controller.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    controller.shutdown().await?;
    Ok(())
}

async fn run_cycle(controller: &SessionController, stop_after_ms: Option<u64>) -> Result<()> {
    if !controller.start().await?.is_applied() {
        warn!("No camera access, requesting permission");
        let status = controller.request_permission().await?;
        if !status.is_granted() {
            anyhow::bail!("Camera access denied");
        }
        if !controller.start().await?.is_applied() {
            anyhow::bail!("Recording did not start after camera access was granted");
        }
    }

    info!("Preview: {:?}", controller.preview());

    if let Some(ms) = stop_after_ms {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        controller.stop().await?;
    }

    let mut updates = controller.subscribe();
    let snapshot = updates
        .wait_for(|s| matches!(s.phase, Phase::Result | Phase::Idle))
        .await
        .context("Session controller stopped mid-cycle")?
        .clone();

    match snapshot.phase {
        Phase::Result => {
            controller.speak().await?;
        }
        _ => {
            warn!("Cycle ended without a result: {:?}", snapshot.last_notice);
        }
    }

    Ok(())
}
