use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::LaunchOptions;

#[derive(Parser)]
#[command(name = "slidectl")]
#[command(author, version, about)]
#[command(long_about = "A slide presentation controller.\n\n\
    Navigate with arrow keys, Page Up/Down, Space, Home/End, swipes, the mouse\n\
    wheel, or the on-screen dots and buttons.\n\n\
    Examples:\n  \
    slidectl deck.md                Launch presentation (fullscreen)\n  \
    slidectl deck.md --windowed     Launch in a window\n  \
    slidectl deck.md --slide 3      Start on the third slide\n  \
    slidectl config show            Print the effective configuration")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Transition duration in milliseconds
    #[arg(long, global = false, value_parser = clap::value_parser!(u64).range(100..=5000))]
    pub delay: Option<u64>,

    /// Disable the particle background
    #[arg(long, global = false)]
    pub no_particles: bool,

    /// Append a JSON line per slide view to this file
    #[arg(long, global = false)]
    pub analytics_log: Option<PathBuf>,

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
        /// Configuration key (e.g. defaults.theme, defaults.animation_delay_ms, particles.enabled)
        key: String,

        /// Value to set
        value: String,
    },
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
                crate::commands::version::run();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    let options = LaunchOptions {
                        windowed: self.windowed,
                        start_slide: self.slide,
                        animation_delay_ms: self.delay,
                        no_particles: self.no_particles,
                        analytics_log: self.analytics_log,
                    };
                    crate::app::run(file, options)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_presentation_flags() {
        let cli = Cli::try_parse_from([
            "slidectl",
            "deck.md",
            "--windowed",
            "--slide",
            "3",
            "--delay",
            "600",
            "--no-particles",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("deck.md")));
        assert!(cli.windowed);
        assert_eq!(cli.slide, Some(3));
        assert_eq!(cli.delay, Some(600));
        assert!(cli.no_particles);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_delay_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["slidectl", "deck.md", "--delay", "10"]).is_err());
    }

    #[test]
    fn test_config_set_subcommand() {
        let cli =
            Cli::try_parse_from(["slidectl", "config", "set", "defaults.theme", "dark"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Set { key, value },
            }) => {
                assert_eq!(key, "defaults.theme");
                assert_eq!(value, "dark");
            }
            _ => panic!("expected config set"),
        }
    }
}
