//! Command-line entry point for the ai-bgm player.

use std::io::Write;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use ai_bgm::config::{self, Paths};
use ai_bgm::error::PlayerError;
use ai_bgm::integrations;
use ai_bgm::lifecycle::supervisor;
use ai_bgm::types::{CueKind, PlaybackRequest};
use ai_bgm::{daemon, logging};

#[derive(Parser)]
#[command(
    name = "ai-bgm",
    version,
    about = "Plays work music in a loop and a done cue when the AI tool finishes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a cue from the selected sound-set
    Play {
        /// Cue to play
        #[arg(value_enum)]
        cue: CueKind,
        /// Number of times to play; 0 loops until stopped
        #[arg(default_value_t = 1)]
        repeat: u32,
        /// Run as the detached worker process (internal use only)
        #[arg(long, hide = true)]
        daemon: bool,
    },
    /// Stop the current player
    Stop,
    /// Stop if playing, otherwise loop the work cue
    Toggle,
    /// Choose the active sound-set
    Select,
    /// Install hooks into an AI tool's settings
    Setup,
    /// Enable playback
    Enable,
    /// Disable playback
    Disable,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let paths = Paths::resolve();

    if let Err(err) = run(cli.command, &paths).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PlayerError>()
        .map(|e| e.code.exit_code())
        .unwrap_or(1)
}

async fn run(command: Commands, paths: &Paths) -> anyhow::Result<()> {
    match command {
        Commands::Play {
            cue,
            repeat,
            daemon: true,
        } => {
            // The worker attaches its own log; no stderr logging here.
            daemon::run(paths, PlaybackRequest::new(cue, repeat)).await?;
        }
        Commands::Play {
            cue,
            repeat,
            daemon: false,
        } => {
            logging::init_cli();
            cmd_play(paths, PlaybackRequest::new(cue, repeat))?;
        }
        Commands::Stop => {
            logging::init_cli();
            cmd_stop(paths)?;
        }
        Commands::Toggle => {
            logging::init_cli();
            cmd_toggle(paths)?;
        }
        Commands::Select => {
            logging::init_cli();
            cmd_select(paths)?;
        }
        Commands::Setup => {
            logging::init_cli();
            cmd_setup()?;
        }
        Commands::Enable => {
            logging::init_cli();
            config::set_enabled(paths, true)?;
            println!("bgm: enabled");
        }
        Commands::Disable => {
            logging::init_cli();
            config::set_enabled(paths, false)?;
            println!("bgm: disabled");
        }
    }
    Ok(())
}

/// Validates the request against the cue library, then supersedes any
/// current player with a fresh detached worker.
///
/// Configuration errors surface here, to the invoking caller, before any
/// running player is disturbed.
fn cmd_play(paths: &Paths, request: PlaybackRequest) -> anyhow::Result<()> {
    let selection = config::load_selection(paths);
    if !selection.enabled {
        println!("AI BGM is disabled. Use 'ai-bgm enable' to enable it.");
        return Ok(());
    }

    let library = config::load_cue_library(paths)?;
    config::resolve_cue_files(&library, &selection.selected, request.cue)?;

    let outcome = supervisor::request_start(paths, request)?;
    if outcome.replaced {
        println!("Stopped previous BGM player");
    }
    println!("BGM player started in background");
    if let Some(pid) = outcome.worker {
        println!("Background player PID: {}", pid);
    }
    Ok(())
}

fn cmd_stop(paths: &Paths) -> anyhow::Result<()> {
    let outcome = supervisor::request_stop(paths)?;
    if outcome.was_stopped() {
        println!("Stopped BGM player");
    } else {
        println!("No BGM player is currently running");
    }
    Ok(())
}

fn cmd_toggle(paths: &Paths) -> anyhow::Result<()> {
    // Advisory read only; the delegated call re-validates under its lock.
    if supervisor::is_player_alive(paths) {
        cmd_stop(paths)
    } else {
        cmd_play(paths, PlaybackRequest::new(CueKind::Work, 0))
    }
}

fn cmd_select(paths: &Paths) -> anyhow::Result<()> {
    let library = config::load_cue_library(paths)?;
    let mut options: Vec<String> = library.keys().cloned().collect();
    options.sort();
    if options.is_empty() {
        bail!("no available BGM configuration");
    }

    let current = config::load_selection(paths).selected;

    println!("Please select BGM configuration:");
    for (i, option) in options.iter().enumerate() {
        let marker = if *option == current { " (current)" } else { "" };
        println!("{}. {}{}", i + 1, option, marker);
    }

    let default_index = options
        .iter()
        .position(|o| *o == current)
        .map(|i| i + 1)
        .unwrap_or(1);
    print!("Enter option (1-{}, current {}): ", options.len(), default_index);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let input = input.trim();

    let chosen = if input.is_empty() {
        options[default_index - 1].clone()
    } else {
        let index: usize = input.parse().context("please enter a valid number")?;
        if index < 1 || index > options.len() {
            bail!("invalid option, please enter 1-{}", options.len());
        }
        options[index - 1].clone()
    };

    let mut state = config::load_selection(paths);
    state.selected = chosen.clone();
    config::save_selection(paths, &state)?;
    println!("Selected: {}", chosen);
    println!("Config saved to: {}", paths.selection_file().display());
    Ok(())
}

fn cmd_setup() -> anyhow::Result<()> {
    let tools = integrations::all_integrations();

    println!("Select AI tool:");
    for (i, tool) in tools.iter().enumerate() {
        let (_, name) = tool.tool_info();
        println!("{}. {}", i + 1, name);
    }
    print!("Enter option: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        println!("Cancelled");
        return Ok(());
    }

    let index: usize = input.parse().context("please enter a valid number")?;
    if index < 1 || index > tools.len() {
        bail!("invalid option, please enter 1-{}", tools.len());
    }
    let tool = &tools[index - 1];

    let settings_path = tool.settings_path();
    if !settings_path.exists() {
        bail!("settings file not found at {}", settings_path.display());
    }

    let text = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("cannot read {}", settings_path.display()))?;
    let mut settings: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
        .with_context(|| format!("malformed settings at {}", settings_path.display()))?;

    tool.install_hooks(&mut settings);

    let out = serde_json::to_string_pretty(&serde_json::Value::Object(settings))?;
    std::fs::write(&settings_path, out)
        .with_context(|| format!("cannot write {}", settings_path.display()))?;

    let (_, name) = tool.tool_info();
    println!("Successfully configured AI BGM for {}", name);
    println!("Settings saved to: {}", settings_path.display());
    Ok(())
}
