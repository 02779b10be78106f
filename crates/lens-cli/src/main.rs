mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use lens_fc::{AircraftState, CancelToken, FlightLink, SimLink};
use lens_geo::{doctor as geo_doctor, plan_with, BoundarySession};
use lens_media::{
    doctor as media_doctor, CaptureLedger, DirMediaLink, FsMediaStore, MediaLink, Progress, TransferError,
    TransferPipeline, TransferSession,
};
use lens_mission::{
    build_survey_mission, BuildContext, MissionBuilder, MissionOutcome, MissionRunner, TimelineScheduler,
};
use lens_proto::timeline::TimelineElementKind;

use config::{load_config, Config, MediaCfg};

#[derive(Debug, Parser)]
#[command(name = "lens", version, about = "FarmLens - field survey planning, flight and imagery offload")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Doctor,
    /// Print the coverage path for the configured boundary.
    Plan {
        #[arg(long)]
        json: bool,
    },
    /// Fly the survey over the configured boundary.
    Fly,
    /// Schedule elements (e.g. take-off go-to go-home) and run the timeline.
    Timeline {
        #[arg(required = true)]
        kinds: Vec<TimelineElementKind>,
        /// Seconds to let the timeline run before stopping it.
        #[arg(long, default_value_t = 0)]
        hold_s: u64,
    },
    Media {
        #[command(subcommand)]
        cmd: MediaCmd,
    },
}

#[derive(Debug, Subcommand)]
enum MediaCmd {
    /// Record how many files are on the card before flight.
    Ledger,
    /// Pull everything captured since the ledger into the library.
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt: cancelling");
                cancel.cancel();
            }
        });
    }

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Plan { json } => plan_cmd(&cfg, json)?,
        Command::Fly => fly(&cfg, &cancel).await?,
        Command::Timeline { kinds, hold_s } => timeline(&cfg, kinds, hold_s, &cancel).await?,
        Command::Media { cmd } => media_cmd(&cfg, cmd, &cancel).await?,
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");

    geo_doctor::check_home(cfg.sim.home())?;
    let poly = geo_doctor::check_boundary(&cfg.boundary.vertices)?;
    let survey = cfg.survey();
    geo_doctor::check_lane_spacing(survey.coverage().lane_spacing, &poly)?;
    geo_doctor::check_altitude(survey.mission().altitude_m)?;

    let hp = cfg.hotpoint();
    anyhow::ensure!(hp.max_angular_velocity(15.0) > 0.0, "hotpoint speeds must be positive");

    if let Some(m) = &cfg.media {
        media_doctor::check_source(&m.source_dir).or_else(|e| {
            warn!("media source not mounted: {:#}", e);
            Ok::<(), anyhow::Error>(())
        })?;
        media_doctor::check_library(&m.temp_dir(), &m.library_dir)?;
        if let Some(n) = m.chunk_size {
            media_doctor::check_chunk_size(n)?;
        }
    }

    info!("doctor: OK");
    Ok(())
}

fn plan_cmd(cfg: &Config, json: bool) -> Result<()> {
    let poly = geo_doctor::check_boundary(&cfg.boundary.vertices)?;
    let coverage = cfg.survey().coverage();
    let path = plan_with(&poly, &coverage).context("plan coverage")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&path)?);
        return Ok(());
    }
    println!(
        "lanes={} points={} length_m={:.1} spacing_ft={:.0}",
        path.lanes(),
        path.len(),
        path.length_m(),
        coverage.lane_spacing.feet()
    );
    for (i, c) in path.points().iter().enumerate() {
        println!("{:>4} {:.7} {:.7}", i, c.lat, c.lon);
    }
    Ok(())
}

async fn fly(cfg: &Config, cancel: &CancelToken) -> Result<()> {
    let mut session = BoundarySession::from_vertices(cfg.boundary.vertices.clone());
    let poly = session.polygon().context("boundary")?;
    let survey = cfg.survey();
    let path = plan_with(&poly, &survey.coverage()).context("plan coverage")?;
    let mission = build_survey_mission(&path, &survey.mission())?;
    session.lock();

    let sim = Arc::new(SimLink::new(cfg.sim.clone()));
    let mut telemetry = sim.subscribe();
    let runner = MissionRunner::new(sim.clone());

    info!("fly: {} waypoints over {} lanes", mission.len(), path.lanes());
    let outcome = runner.fly(mission, cancel).await?;

    let mut aircraft = AircraftState::default();
    while let Ok(ev) = telemetry.try_recv() {
        aircraft.apply(&ev);
    }
    match outcome {
        MissionOutcome::Completed => println!("mission complete"),
        MissionOutcome::ReturnedHome => println!("signal lost; aircraft returned home"),
    }
    if let Some(c) = aircraft.location {
        println!("last position {:.7} {:.7}", c.lat, c.lon);
    }
    Ok(())
}

async fn timeline(cfg: &Config, kinds: Vec<TimelineElementKind>, hold_s: u64, cancel: &CancelToken) -> Result<()> {
    let sim = Arc::new(SimLink::new(cfg.sim.clone()));
    let mut events = sim.subscribe();
    let mut sched = TimelineScheduler::new(sim.clone(), MissionBuilder::new(cfg.hotpoint()));

    let ctx = BuildContext::from_link(sim.as_ref());
    for kind in kinds {
        let idx = sched.schedule(kind, &ctx).await.with_context(|| format!("schedule {}", kind))?;
        println!("{:>2} {}", idx, kind);
    }

    sched.start().await.context("start timeline")?;
    sched.pump(&mut events);
    println!("timeline {}", sched.state());

    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(Duration::from_secs(hold_s)) => {}
    }

    sched.stop().await.context("stop timeline")?;
    sched.pump(&mut events);
    println!("timeline {}", sched.state());
    Ok(())
}

async fn media_cmd(cfg: &Config, cmd: MediaCmd, cancel: &CancelToken) -> Result<()> {
    let m = cfg.media.as_ref().context("no [media] config section")?;
    let link = Arc::new(DirMediaLink::new(&m.source_dir, m.chunk_size));

    match cmd {
        MediaCmd::Ledger => {
            let ledger = CaptureLedger::capture(link.as_ref()).await?;
            ledger.store(&m.ledger_path()).await?;
            println!("{} files on card", ledger.pre_flight_count());
            Ok(())
        }
        MediaCmd::Download => download(m, link, cancel).await,
    }
}

async fn download(m: &MediaCfg, link: Arc<DirMediaLink>, cancel: &CancelToken) -> Result<()> {
    let start = match m.pre_flight_count {
        Some(n) => n,
        None => match CaptureLedger::load(&m.ledger_path()).await {
            Ok(l) => l.pre_flight_count(),
            Err(e) => {
                warn!("media: no ledger ({:#}); downloading the whole card", e);
                0
            }
        },
    };

    let listing = link.list_files().await?;
    let mut session = TransferSession::new(listing, start);
    let store = Arc::new(FsMediaStore::new(m.temp_dir(), &m.library_dir));
    let pipeline = TransferPipeline::new(link, store);

    let report_progress = |p: Progress| match p {
        Progress::Ready { total: 0 } => println!("There are no pictures to download"),
        Progress::Ready { .. } => {}
        Progress::Downloading { seq, total } => println!("Downloading file {} of {}", seq, total),
        Progress::Saved { path, .. } => println!("  saved {}", path.display()),
        Progress::PersistFailed { seq, reason } => println!("  file {} not saved: {}", seq, reason),
        Progress::Complete { saved, failed } => println!("done: {} saved, {} failed", saved, failed),
    };

    let mut attempts = m.retries.unwrap_or(3);
    loop {
        match pipeline.run(&mut session, cancel, report_progress).await {
            Ok(_) => return Ok(()),
            Err(e @ TransferError::ChunkFailed { .. }) | Err(e @ TransferError::SizeMismatch { .. }) if attempts > 0 => {
                attempts -= 1;
                warn!("media: {}; retrying ({} left)", e, attempts);
            }
            Err(e) => return Err(e).context("media download"),
        }
    }
}
