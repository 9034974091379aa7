use crate::config::{CliOverrides, Config};
use crate::error::{Result, VouchrError};
use crate::record::Field;
use crate::ui::OutputMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vouchr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn pasted reward messages into saved voucher records")]
#[command(
    long_about = "Vouchr pulls the title, platform, sharing channel, voucher code, link and \
                  expiry date out of a pasted reward message, lets you correct them, and \
                  stores the voucher through a remote HTTP endpoint."
)]
#[command(before_help = "🎟️  Vouchr - Voucher Extractor")]
#[command(after_help = "EXAMPLES:\n  \
    vouchr parse message.txt\n  \
    pbpaste | vouchr submit --voucher-code ABC-123\n  \
    vouchr submit --text \"$MESSAGE\" --expiry 2025-01-31\n  \
    vouchr list --output-format json\n  \
    vouchr interactive --config my-vouchr.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Endpoint that stores a voucher
    #[arg(long, global = true, env = "VOUCHR_SAVE_URL")]
    pub save_url: Option<String>,

    /// Endpoint that returns every stored voucher
    #[arg(long, global = true, env = "VOUCHR_LIST_URL")]
    pub list_url: Option<String>,

    #[arg(long, global = true, env = "VOUCHR_TIMEOUT", help = "Request timeout (seconds)")]
    pub timeout: Option<u64>,

    /// Channel used when a message names none
    #[arg(long, global = true, env = "VOUCHR_DEFAULT_SHARED_VIA")]
    pub default_shared_via: Option<String>,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the fields found in a message without saving anything
    Parse(InputArgs),

    /// Parse a message, apply corrections, and save the voucher
    Submit {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        fields: FieldOverrides,
    },

    /// Show every stored voucher
    List,

    /// Paste, edit and submit vouchers from a prompt
    Interactive,
}

#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// File holding the message (reads stdin when neither this nor --text is given)
    pub file: Option<PathBuf>,

    /// Message text
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,
}

impl InputArgs {
    pub fn read_text(&self) -> Result<String> {
        if let Some(ref text) = self.text {
            return Ok(text.clone());
        }

        match self.file {
            Some(ref path) => Ok(std::fs::read_to_string(path)?),
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
        }
    }
}

/// Field values that replace whatever the parser found.
#[derive(Args, Debug, Default)]
pub struct FieldOverrides {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub platform: Option<String>,

    #[arg(long)]
    pub shared_via: Option<String>,

    #[arg(long)]
    pub voucher_code: Option<String>,

    #[arg(long)]
    pub link: Option<String>,

    /// Expiry date as YYYY-MM-DD
    #[arg(long)]
    pub expiry: Option<String>,
}

impl FieldOverrides {
    pub fn edits(&self) -> Vec<(Field, String)> {
        [
            (Field::Title, &self.title),
            (Field::Platform, &self.platform),
            (Field::SharedVia, &self.shared_via),
            (Field::VoucherCode, &self.voucher_code),
            (Field::Link, &self.link),
            (Field::Expiry, &self.expiry),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_save_url(self.save_url.clone())
            .with_list_url(self.list_url.clone())
            .with_timeout(self.timeout)
            .with_default_shared_via(self.default_shared_via.clone())
    }

    /// The subcommand to run, or an error when only global flags were given.
    pub fn command(&self) -> Result<&Command> {
        self.command.as_ref().ok_or_else(|| VouchrError::Command {
            message: "no subcommand given".to_string(),
        })
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
