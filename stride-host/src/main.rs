//! Stride - step counter with a daily reset
//!
//! `stride run` counts steps from a replayed sensor recording (or by hand)
//! until interrupted. The other subcommands inspect or change the stored
//! state and exit.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use stride_core::traits::SampleHandler;
use stride_core::{MotionSensor, ObserverError, ResetTime};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use stride_host::adapters::{FileStore, NoSensor, ReplaySensor, SystemClock};
use stride_host::config::HostConfig;
use stride_host::console;
use stride_host::runtime::{Command, Runtime, COMMAND_QUEUE_DEPTH};

#[derive(Debug, Parser)]
#[command(name = "stride", version)]
#[command(about = "Step counter with a configurable daily reset")]
struct Cli {
    /// Configuration file (default: ./stride.toml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Reset time to use when none is stored yet (HH:MM)
    #[arg(long, global = true)]
    reset_time: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Count steps until interrupted
    Run(RunArgs),
    /// Show the current count and next reset
    Status,
    /// List archived daily totals
    History,
    /// Change the daily reset time
    SetResetTime { time: String },
    /// Archive the current total and start from zero
    Reset,
    /// Count one step by hand
    Step,
}

#[derive(Debug, Args, Default)]
struct RunArgs {
    /// Sample recording to replay (overrides the config file)
    #[arg(long)]
    samples: Option<PathBuf>,
    /// Playback rate for lines without a timestamp
    #[arg(long)]
    rate_hz: Option<u32>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = HostConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(time) = cli.reset_time {
        if !ResetTime::is_valid(&time) {
            bail!("--reset-time {time:?} is not HH:MM");
        }
        config.default_reset_time = Some(time);
    }

    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let mut runtime = Runtime::new(store, SystemClock, config.engine);

    let boot = runtime
        .pedometer_mut()
        .boot(config.default_reset_time.as_deref());
    if let Some(entry) = &boot.caught_up {
        println!("{}", console::render_archived(entry));
    }

    let command = match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => return run(runtime, config, args).await,
        other => other,
    };

    let pedometer = runtime.pedometer_mut();
    match command {
        Commands::Run(_) => {}
        Commands::Status => println!("{}", console::render_status(&pedometer.status())),
        Commands::History => println!("{}", console::render_history(&pedometer.history())),
        Commands::SetResetTime { time } => {
            let accepted = pedometer.update_reset_time(&time);
            let message = console::render_reset_time_reply(&time, accepted);
            if !accepted {
                bail!(message);
            }
            println!("{message}");
        }
        Commands::Reset => println!("{}", console::render_archived(&pedometer.reset_now())),
        Commands::Step => println!("steps: {}", pedometer.add_manual_step()),
    }
    pedometer.shutdown();
    Ok(())
}

async fn run(
    mut runtime: Runtime<FileStore, SystemClock>,
    config: HostConfig,
    args: RunArgs,
) -> Result<()> {
    let rate_hz = args.rate_hz.unwrap_or(config.replay.rate_hz);
    let mut sensor: Box<dyn MotionSensor> = match args.samples.or(config.replay.samples) {
        Some(path) => Box::new(ReplaySensor::from_file(&path, rate_hz)?),
        None => Box::new(NoSensor),
    };

    let (sample_tx, sample_rx) = mpsc::unbounded_channel();
    let on_sample: SampleHandler = Box::new(move |sample| {
        // Closed once the runtime has stopped
        let _ = sample_tx.send(sample);
    });
    let pedometer = runtime.pedometer_mut();
    if let Err(e) = pedometer.activate_sensor(sensor.as_mut(), on_sample) {
        eprintln!("{e}; type `step` to count by hand");
    }
    pedometer.add_observer(|count| {
        use std::io::Write;
        writeln!(std::io::stdout().lock(), "steps: {count}")
            .map_err(|e| ObserverError::new(e.to_string()))
    });
    println!("{}", console::render_status(&pedometer.status()));

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    tokio::spawn(console::serve(
        console::stdin_lines(),
        command_tx.clone(),
        |rendered| println!("{rendered}"),
    ));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = command_tx.send(Command::Shutdown).await;
        }
    });

    runtime.run(sample_rx, command_rx).await;
    sensor.stop_listening();
    Ok(())
}
