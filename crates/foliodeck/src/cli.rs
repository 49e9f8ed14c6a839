use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foliodeck")]
#[command(author, version, about)]
#[command(long_about = "A spatially-navigable portfolio deck.\n\n\
    Presents a set of project slides on a 3D canvas with a mini-map,\n\
    progress bar, toolbar and autoplay.\n\n\
    Examples:\n  \
    foliodeck                    Launch the built-in portfolio (fullscreen)\n  \
    foliodeck deck.yaml          Launch a deck from a YAML file\n  \
    foliodeck --windowed         Launch in a window\n  \
    foliodeck --overview         Start zoomed out on the overview")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present (YAML). Defaults to the built-in portfolio.
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Start zoomed out on the overview slide
    #[arg(long, global = false)]
    pub overview: bool,

    /// Skip repository metadata fetch
    #[arg(long, global = false)]
    pub offline: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.start_mode)
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the configuration file path
    Path,
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("foliodeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                let deck = if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::deck::load(&file)?
                } else {
                    crate::deck::builtin()
                };
                crate::app::run(
                    deck,
                    self.windowed,
                    self.slide,
                    self.overview,
                    self.offline,
                )
            }
        }
    }
}
