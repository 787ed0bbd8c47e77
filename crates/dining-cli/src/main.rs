use std::env;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dining_core::StudyConfig;
use dining_core::StudyState;
use dining_exec::HttpTransport;
use dining_exec::ScriptedTransport;
use dining_exec::StateTransport;
use dining_exec::TransitionOrchestrator;

mod logging;
mod ui;

const CONFIG_FILE: &str = "config.toml";

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("dining-room {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "run" => {
            let options = parse_run_args(args.collect::<Vec<_>>())?;
            run_session(options)
        }
        "config" => {
            let options = parse_run_args(args.collect::<Vec<_>>())?;
            if options.offline {
                return Err("--offline is only accepted by `run`".into());
            }
            let config = load_config(options.config.as_deref())?;
            print!("{}", render_config(&config)?);
            Ok(())
        }
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RunOptions {
    config: Option<PathBuf>,
    offline: bool,
}

fn parse_run_args(args: Vec<String>) -> Result<RunOptions, Box<dyn std::error::Error>> {
    let mut options = RunOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--config requires a path".into());
                };
                options.config = Some(PathBuf::from(value));
                i += 2;
            }
            "--offline" => {
                options.offline = true;
                i += 1;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    Ok(options)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dining-room").join(CONFIG_FILE))
}

/// An explicit path must exist; the default location is optional and falls
/// back to built-in defaults.
fn load_config(explicit: Option<&Path>) -> Result<StudyConfig, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(StudyConfig::load(path)?);
    }
    match default_config_path() {
        Some(path) if path.is_file() => Ok(StudyConfig::load(path)?),
        _ => Ok(StudyConfig::default()),
    }
}

fn render_config(config: &StudyConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

fn run_session(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(options.config.as_deref())?;
    let log_path = logging::init()?;
    tracing::info!(
        log = %log_path.display(),
        offline = options.offline,
        endpoint = %config.endpoint.next_state_url,
        "starting participant session"
    );

    let transport: Arc<dyn StateTransport> = if options.offline {
        Arc::new(ScriptedTransport::demo())
    } else {
        Arc::new(HttpTransport::new(&config.endpoint))
    };
    let submit_delay = Duration::from_millis(config.endpoint.submit_delay_ms);
    let (orchestrator, events) = TransitionOrchestrator::new(transport, submit_delay);

    let state = StudyState::new(config);
    let outcome = ui::run(state, orchestrator, events);
    tracing::info!("participant session closed");
    outcome
}

fn print_help() {
    println!("dining-room {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  dining-room run [--config PATH] [--offline]");
    println!("  dining-room config [--config PATH]");
    println!("  dining-room help | version");
    println!();
    println!("Options:");
    println!("  --config PATH   study configuration (TOML)");
    println!("  --offline       answer transitions from a built-in demo script");
    println!();
    println!("Keys:");
    println!("  up/down move, space toggle diagnosis, left/right certainty,");
    println!("  enter confirm, r retry request, c copy completion link, q quit");
}
