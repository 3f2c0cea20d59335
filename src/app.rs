//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands::{self, RenderRequest};
use crate::config::get_config_path;
use crate::logging;
use crate::setup;
use crate::waveform::{Reduction, RenderStyle};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// Render audio files into static waveform images
#[derive(Parser)]
#[command(name = "wavr")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "Render audio files into static waveform images.\n\nDEFAULT COMMAND:\n    If no command is specified, 'render' is used by default.\n\nEXAMPLES:\n    # Render next to the input file (song.png)\n    $ wavr song.wav\n\n    # Stereo input writes take-left.png and take-right.png\n    $ wavr render take.flac -o take.png\n\n    # Block peaks with a 36 dB range\n    $ wavr render song.mp3 --preset block-dark --decibel-range 36\n\n    # Pick everything from prompts\n    $ wavr interactive song.wav\n\n    # Edit configuration file\n    $ wavr config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavr/wavr.toml\n    Logs:               ~/.local/state/wavr/wavr.log.*"
)]
struct Cli {
    /// Audio file to render (render default command)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    #[command(flatten)]
    options: RenderOptions,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by the default command and `render`.
#[derive(Args, Debug, Clone, Default)]
struct RenderOptions {
    /// Output PNG; stereo input adds -left and -right to the name
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Preset to start from (see `wavr presets`)
    #[arg(short, long, value_name = "PRESET")]
    preset: Option<String>,

    /// Drawing style
    #[arg(short, long, value_enum)]
    style: Option<RenderStyle>,

    /// Sample reduction: first, last, average, min, max, rms,
    /// peak-max, peak-rms, peak-sampling or peak-average
    #[arg(short, long, value_name = "REDUCTION")]
    reduction: Option<Reduction>,

    /// Maximum image width in pixels; turns off automatic width
    #[arg(long, value_name = "N")]
    width: Option<i32>,

    /// Keep the configured width instead of growing with the audio
    #[arg(long)]
    fixed_width: bool,

    /// Amplitude multiplier (1.0 - 9.5)
    #[arg(long, value_name = "F")]
    volume_boost: Option<f32>,

    /// Dynamic range in dB for decibel-scaled peaks (block style)
    #[arg(long, value_name = "DB")]
    decibel_range: Option<f64>,
}

impl RenderOptions {
    fn into_request(self, file: PathBuf) -> RenderRequest {
        RenderRequest {
            file,
            output: self.output,
            preset: self.preset,
            style: self.style,
            reduction: self.reduction,
            width: self.width,
            fixed_width: self.fixed_width,
            volume_boost: self.volume_boost,
            decibel_range: self.decibel_range,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render an audio file to PNG (default)
    ///
    /// Mono input writes one image. Stereo input writes one image per channel.
    /// The written paths are printed to stdout.
    #[command(visible_alias = "r")]
    Render {
        /// Audio file to render; anything but WAV is converted with ffmpeg
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        options: RenderOptions,
    },

    /// Choose preset, style and reduction from prompts, then render
    #[command(visible_alias = "i")]
    Interactive {
        /// Audio file to render
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the built-in presets
    Presets,

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   wavr completions bash > wavr.bash
    ///   wavr completions zsh > _wavr
    ///   wavr completions fish > wavr.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavr", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Presets) => {
            commands::handle_presets();
            return Ok(());
        }
        Some(Commands::Logs) => {
            if let Err(e) = commands::handle_logs() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            return Ok(());
        }
        _ => {}
    }

    logging::init_logging()?;

    if let Err(e) = dispatch(cli).await {
        let message = e.to_string();
        if message.contains("cancelled") || message.contains("interrupted") {
            // cliclack already showed the cancellation
            process::exit(0);
        }
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
    Ok(())
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    if let Err(e) = setup::ensure_config(&config_path) {
        tracing::warn!("Config setup failed: {e}");
    }

    match cli.command {
        None => {
            let Some(file) = cli.file else {
                Cli::command().print_help()?;
                return Ok(());
            };
            commands::handle_render(cli.options.into_request(file))
        }
        Some(Commands::Render { file, options }) => {
            commands::handle_render(options.into_request(file))
        }
        Some(Commands::Interactive { file }) => commands::handle_interactive(file).await,
        Some(Commands::Config) => commands::handle_config(),
        Some(Commands::Completions { .. } | Commands::Presets | Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }
}
