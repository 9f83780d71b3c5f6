use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "teslacli", version, about = "Run commands against a Tesla vehicle")]
pub struct Cli {
    /// Vehicle id to operate on
    #[arg(short = 'i', long)]
    pub vehicle_id: Option<String>,

    /// List all available vehicles
    #[arg(short, long)]
    pub list: bool,

    /// Get vehicle state
    #[arg(short, long)]
    pub state: bool,

    /// Get drive state
    #[arg(short, long)]
    pub drive_state: bool,

    /// Initiate charging on vehicle
    #[arg(short = 'c', long)]
    pub charging_start: bool,

    /// Finish charging on vehicle
    #[arg(short = 'f', long)]
    pub charging_stop: bool,

    /// Wake up the vehicle
    #[arg(short, long)]
    pub wake: bool,

    /// Print current access token (refresh if needed)
    #[arg(long)]
    pub print_token: bool,

    /// Delete saved token file
    #[arg(long)]
    pub clear_token: bool,

    /// Config file (defaults to <config dir>/teslacli/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Token cache file, overrides the config value
    #[arg(long, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manipulate sentry mode
    SentryMode(SentryArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SentryArgs {
    /// Turn sentry mode on
    #[arg(long)]
    pub on: bool,

    /// Turn sentry mode off
    #[arg(long)]
    pub off: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Sentry mode requested through the subcommand, if any.
    pub fn sentry(&self) -> Option<bool> {
        match &self.command {
            Some(Command::SentryMode(args)) => Some(args.on),
            None => None,
        }
    }
}
