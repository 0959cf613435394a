mod prompt;
mod sim;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use admediator::provider::admob::AdMobAdapter;
use admediator::provider::vungle::VungleAdapter;
use admediator::{
    AdMediator, AdSlotKind, BackendMode, BuildProfile, CancellationToken, MediatorConfig,
    MediatorHandle, PauseBridge, ProviderKind, ProviderPlacements, RewardOutcome,
    ScriptedPresenter, SlotRoutes,
};

use crate::prompt::PromptPresenter;
use crate::sim::{ConsoleClock, SimAdMob, SimBehavior, SimVungle};

struct Options {
    config: Option<PathBuf>,
    offline: bool,
    profile: Option<BuildProfile>,
    auto: Option<RewardOutcome>,
    behavior: SimBehavior,
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let options = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("Usage: admediator-sim [--config <file>] [--offline] [--profile debug|release]");
            eprintln!("                      [--auto full|partial] [--latency-ms <n>] [--no-fill] [--skip-videos]");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --config <file>    JSON mediator config [default: built-in sim config]");
            eprintln!("  --offline          Serve every slot from the mock presenter");
            eprintln!("  --profile <p>      Build profile selecting test or production ids");
            eprintln!("  --auto <choice>    Answer mock presentations automatically");
            eprintln!("  --latency-ms <n>   Simulated SDK latency [default: 500]");
            eprintln!("  --no-fill          Simulated loads fail");
            eprintln!("  --skip-videos      Simulated videos close before the reward");
            process::exit(2);
        }
    };

    init_tracing();

    if let Err(e) = run(options).await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        config: None,
        offline: false,
        profile: None,
        auto: None,
        behavior: SimBehavior::default(),
    };

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config = Some(PathBuf::from(
                    args.get(i).ok_or("--config requires a value")?,
                ));
            }
            "--offline" => options.offline = true,
            "--profile" => {
                i += 1;
                let value = args.get(i).ok_or("--profile requires a value")?;
                options.profile = Some(
                    BuildProfile::parse(value)
                        .ok_or_else(|| format!("invalid profile '{value}', expected 'debug' or 'release'"))?,
                );
            }
            "--auto" => {
                i += 1;
                options.auto = match args.get(i).map(String::as_str) {
                    Some("full") => Some(RewardOutcome::FullView),
                    Some("partial") => Some(RewardOutcome::PartialView),
                    Some(other) => {
                        return Err(format!("invalid choice '{other}', expected 'full' or 'partial'"));
                    }
                    None => return Err("--auto requires a value".to_string()),
                };
            }
            "--latency-ms" => {
                i += 1;
                let value = args.get(i).ok_or("--latency-ms requires a value")?;
                let ms: u64 = value
                    .parse()
                    .map_err(|_| format!("invalid latency '{value}'"))?;
                options.behavior.latency = Duration::from_millis(ms);
            }
            "--no-fill" => options.behavior.no_fill = true,
            "--skip-videos" => options.behavior.skip_videos = true,
            "--help" | "-h" => return Err("".to_string()),
            arg => return Err(format!("unexpected argument: {arg}")),
        }
        i += 1;
    }

    Ok(options)
}

fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let base_level = match std::env::var("ADMEDIATOR_LOG").as_deref() {
            Ok("trace") => "trace",
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };

        let filter_str = format!(
            "admediator={level},admediator_sim={level},admediator::slot=warn",
            level = base_level
        );

        EnvFilter::new(filter_str)
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

/// Test units everywhere so release builds of the sim still resolve.
fn sim_config() -> MediatorConfig {
    MediatorConfig::new()
        .with_routes(SlotRoutes::standard())
        .with_provider(
            ProviderKind::AdMob,
            ProviderPlacements::admob_test_units("ca-app-pub-3940256099942544~3347511713")
                .with_production(AdSlotKind::Banner, "ca-app-pub-3940256099942544/6300978111")
                .with_production(AdSlotKind::Interstitial, "ca-app-pub-3940256099942544/1033173712")
                .with_production(AdSlotKind::Rewarded, "ca-app-pub-3940256099942544/5224354917"),
        )
        .with_provider(
            ProviderKind::Vungle,
            ProviderPlacements::new("sim-vungle-app")
                .with_production(AdSlotKind::Rewarded, "DEFAULT04628"),
        )
}

fn load_config(options: &Options) -> anyhow::Result<MediatorConfig> {
    let mut config = match &options.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MediatorConfig::from_json_str(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => sim_config(),
    };
    config = config.with_env_overrides();
    if options.offline {
        config = config.with_mode(BackendMode::Offline);
    }
    if let Some(profile) = options.profile {
        config = config.with_profile(profile);
    }
    Ok(config)
}

async fn run(options: Options) -> anyhow::Result<()> {
    let config = load_config(&options)?;
    tracing::info!(
        mode = config.mode.as_str(),
        profile = ?config.profile,
        "Starting ad mediation simulator"
    );

    let prompt = PromptPresenter::default();
    let builder = AdMediator::builder(config)
        .provider(AdMobAdapter::new(SimAdMob::new(options.behavior)))?
        .provider(VungleAdapter::new(SimVungle::new(options.behavior)))?
        .pause_bridge(PauseBridge::new().with_clock(Box::new(ConsoleClock))?);
    let builder = match options.auto {
        Some(choice) => builder.presenter(ScriptedPresenter::new(choice)),
        None => builder.presenter(prompt.clone()),
    };
    let mediator = builder.build()?;

    let shutdown = CancellationToken::new();
    let (handle, task) = admediator::service::spawn(mediator, shutdown.clone());

    handle.init().await.context("initializing providers")?;
    println!("ready. type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_help(),
            ["full"] => resolve(&prompt, RewardOutcome::FullView),
            ["partial"] => resolve(&prompt, RewardOutcome::PartialView),
            ["status"] => {
                let status = handle.status().await?;
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
            ["available"] => {
                println!("rewarded available: {}", handle.is_rewarded_available().await?);
            }
            ["load", "interstitial"] => handle.load_interstitial()?,
            ["load", "rewarded"] => spawn_load_rewarded(&handle),
            ["show", "interstitial"] => spawn_show_interstitial(&handle),
            ["show", "rewarded"] => spawn_show_rewarded(&handle),
            ["banner", "show"] => handle.show_banner()?,
            ["banner", "hide"] => handle.hide_banner()?,
            ["banner", "destroy"] => handle.destroy_banner()?,
            _ => println!("unknown command: {line} (type 'help')"),
        }
    }

    shutdown.cancel();
    let mediator = task.await?;
    tracing::info!(status = ?mediator.status().init, "Simulator stopped");
    Ok(())
}

fn resolve(prompt: &PromptPresenter, outcome: RewardOutcome) {
    if !prompt.resolve(outcome) {
        println!("no mock ad is waiting for an answer");
    }
}

fn spawn_load_rewarded(handle: &MediatorHandle) {
    let handle = handle.clone();
    tokio::spawn(async move {
        match handle.load_rewarded().await {
            Ok(loaded) => println!("rewarded loaded: {loaded}"),
            Err(e) => println!("rewarded load: {e}"),
        }
    });
}

fn spawn_show_interstitial(handle: &MediatorHandle) {
    let handle = handle.clone();
    tokio::spawn(async move {
        match handle.show_interstitial().await {
            Ok(shown) => println!("interstitial closed (shown: {shown})"),
            Err(e) => println!("interstitial: {e}"),
        }
    });
}

fn spawn_show_rewarded(handle: &MediatorHandle) {
    let handle = handle.clone();
    tokio::spawn(async move {
        match handle.show_rewarded().await {
            Ok(RewardOutcome::FullView) => println!("rewarded finished: full view, grant the reward"),
            Ok(RewardOutcome::PartialView) => println!("rewarded finished: partial view, no reward"),
            Err(e) => println!("rewarded show: {e}"),
        }
    });
}

fn print_help() {
    println!("commands:");
    println!("  load interstitial | load rewarded");
    println!("  show interstitial | show rewarded");
    println!("  banner show | banner hide | banner destroy");
    println!("  available           is a rewarded ad ready");
    println!("  full | partial      answer the pending mock ad");
    println!("  status              print the mediator status as JSON");
    println!("  quit");
}
