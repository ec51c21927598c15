use clap::{Args, Parser, Subcommand};
use midi_configurator::AppConfig;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "midi-configurator",
    author = "MIDI Configurator Team",
    version,
    about = "Configure a six-button MIDI foot controller",
    long_about = "Configure a six-button MIDI foot controller through the configurator backend: manage MIDI commands, map them to buttons, save presets and push the result to the device"
)]
pub struct Cli {
    /// Base URL of the configurator backend API
    #[arg(
        long,
        global = true,
        env = "MIDI_CONFIGURATOR_API_URL",
        default_value = "http://localhost:5001/api"
    )]
    pub api_url: String,

    /// Do not show sample data when the backend is unreachable
    #[arg(long, global = true)]
    pub no_offline_fallback: bool,

    /// Port list refresh interval in seconds
    #[arg(long, global = true, default_value = "5")]
    pub poll_interval: u64,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Run against an in-process demo backend instead of the HTTP API
    #[arg(long, global = true)]
    pub demo: bool,

    /// Logging preset: development, production or test
    #[arg(long, global = true, env = "MIDI_CONFIGURATOR_ENV", default_value = "console")]
    pub env: String,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_url.clone(),
            offline_fallback: !self.no_offline_fallback,
            poll_interval: Duration::from_secs(self.poll_interval.max(1)),
            environment: self.env.clone(),
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the MIDI command registry
    #[command(subcommand)]
    Commands(CommandAction),
    /// Show or change the button mappings
    #[command(subcommand)]
    Map(MapAction),
    /// Manage saved mapping presets
    #[command(subcommand)]
    Presets(PresetAction),
    /// Discover and test USB/serial ports
    #[command(subcommand)]
    Ports(PortAction),
    /// Send the current mappings to the device
    Push(PushArgs),
    /// Show a one-line session summary
    Status,
    /// Show build and backend information
    Info,
}

#[derive(Subcommand, Debug)]
pub enum CommandAction {
    /// List commands
    List,
    /// Add a command
    Add {
        name: String,
        /// MIDI value (0-65535)
        value: i64,
    },
    /// Change a command's name and value
    Edit { id: i64, name: String, value: i64 },
    /// Delete a command and clear the buttons using it
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum MapAction {
    /// Show all six buttons
    Show,
    /// Assign a command to a button
    Set {
        /// Button number (1-6)
        button: i64,
        command_id: i64,
    },
    /// Remove the command from a button
    Clear { button: i64 },
    /// Set a button color (preset name or #rrggbb)
    Color { button: i64, color: String },
    /// List the preset color names
    Palette,
}

#[derive(Subcommand, Debug)]
pub enum PresetAction {
    /// List presets, newest first
    List,
    /// Save the current mappings as a preset
    Save {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Replace the current mappings with a preset
    Load { id: i64 },
    /// Delete a preset
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum PortAction {
    /// List available ports
    List,
    /// Check that a port opens and answers
    Test { port: String },
    /// Keep refreshing the port list until Ctrl-C
    Watch {
        /// Select this port and report when it disappears
        #[arg(long)]
        select: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Port the device is connected to
    #[arg(short, long)]
    pub port: Option<String>,
    /// Show the configuration message without sending it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "midi-configurator",
            "push",
            "--port",
            "COM3",
            "--demo",
            "--poll-interval",
            "2",
        ])
        .unwrap();
        assert!(cli.demo);
        let config = cli.app_config();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        match cli.command {
            Commands::Push(args) => {
                assert_eq!(args.port.as_deref(), Some("COM3"));
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_map_color_arguments() {
        let cli =
            Cli::try_parse_from(["midi-configurator", "map", "color", "2", "#abcdef"]).unwrap();
        match cli.command {
            Commands::Map(MapAction::Color { button, color }) => {
                assert_eq!(button, 2);
                assert_eq!(color, "#abcdef");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
