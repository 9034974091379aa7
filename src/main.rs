use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;
use vouchr::{
    Cli, Command, InteractiveShell, OutputFormatter, SaveOutcome, UserFriendlyError, Vouchr,
    VouchrError,
};

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let command = match cli.command() {
        Ok(command) => command,
        Err(e) => {
            print_startup_error(&cli, &e);
            return exit_code_for(&e);
        }
    };

    let vouchr = match Vouchr::from_cli(&cli) {
        Ok(vouchr) => vouchr,
        Err(e) => {
            print_startup_error(&cli, &e);
            return exit_code_for(&e);
        }
    };

    match execute(&vouchr, command).await {
        Ok(code) => code,
        Err(e) => {
            vouchr.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

async fn execute(vouchr: &Vouchr, command: &Command) -> vouchr::Result<i32> {
    match command {
        Command::Parse(input) => {
            let text = input.read_text()?;
            let parsed = vouchr.parse_text(&text);
            vouchr.output_formatter().print_parsed(&parsed);
            Ok(0)
        }
        Command::Submit { input, fields } => {
            let text = input.read_text()?;
            match vouchr.submit_text(&text, &fields.edits()).await? {
                SaveOutcome::Saved => Ok(0),
                SaveOutcome::Duplicate => Ok(2),
            }
        }
        Command::List => {
            let mut session = vouchr::VoucherSession::new();
            vouchr.load_all(&mut session).await?;
            Ok(0)
        }
        Command::Interactive => {
            let stdin = std::io::stdin();
            let mut shell = InteractiveShell::new(vouchr);
            shell.run(stdin.lock()).await?;
            Ok(0)
        }
    }
}

fn exit_code_for(error: &VouchrError) -> i32 {
    match error {
        VouchrError::Cancelled => 130, // Interrupted (SIGINT)
        VouchrError::Validation { .. } => 3,
        VouchrError::InvalidField { .. } => 4,
        VouchrError::Transport { .. } | VouchrError::Timeout { .. } => 5,
        VouchrError::Server { .. } | VouchrError::MalformedResponse { .. } => 6,
        VouchrError::Config { .. } | VouchrError::InvalidUrl { .. } | VouchrError::Pattern { .. } => 7,
        _ => 1,
    }
}

fn setup_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "vouchr=warn",
        1 => "vouchr=debug",
        _ => "vouchr=trace",
    };

    // Logs go to stderr so JSON output on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "vouchr.toml".to_string());

    match Vouchr::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  vouchr interactive --config {}", config_path);
            println!("\nEdit the endpoint URLs before submitting vouchers.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(cli: &Cli, error: &VouchrError) {
    let formatter = OutputFormatter::new(cli.output_format.into(), 0, cli.quiet);
    formatter.print_user_friendly_error(error);
}
