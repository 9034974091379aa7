pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod record;
pub mod services;
pub mod session;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, Command, OutputFormat};
pub use config::{BrandConfig, CliOverrides, Config, EndpointConfig, ParserConfig};
pub use error::{Result, UserFriendlyError, VouchrError};
pub use parser::{ParsedVoucher, VoucherParser};
pub use record::{Field, VoucherRecord};
pub use services::{HttpVoucherService, ListService, SaveOutcome, SaveService};
pub use session::{ViewMode, VoucherSession};
pub use ui::{GracefulShutdown, InteractiveShell, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use std::sync::Arc;

/// Main library interface: parser, endpoints and terminal output wired
/// together from one configuration.
pub struct Vouchr {
    config: Config,
    parser: VoucherParser,
    save_service: Arc<dyn SaveService>,
    list_service: Arc<dyn ListService>,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl Vouchr {
    /// Create a new Vouchr instance talking to the configured HTTP endpoints
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Self::build(config, output_mode, verbose, quiet, shutdown)
    }

    /// Create a new Vouchr instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::build(config, output_mode, verbose, quiet, GracefulShutdown::new_for_test())
            .expect("test configuration must be valid")
    }

    fn build(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Result<Self> {
        config.validate()?;

        let parser = VoucherParser::new(&config.parser)?;
        let http = Arc::new(HttpVoucherService::new(&config.endpoints)?);
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Ok(Self {
            config,
            parser,
            save_service: http.clone(),
            list_service: http,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create Vouchr instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(
            config,
            cli_args.output_format.into(),
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    /// Replace the HTTP endpoints, e.g. with in-process fakes
    pub fn with_services(
        mut self,
        save_service: Arc<dyn SaveService>,
        list_service: Arc<dyn ListService>,
    ) -> Self {
        self.save_service = save_service;
        self.list_service = list_service;
        self
    }

    pub fn parse_text(&self, text: &str) -> ParsedVoucher {
        self.parser.parse(text)
    }

    /// Submit the session's record, showing a spinner while the request runs
    pub async fn submit(&self, session: &mut VoucherSession) -> Result<SaveOutcome> {
        self.shutdown.check_shutdown()?;

        let spinner = self.progress_manager.create_spinner("Submitting...");
        let result = session.submit(self.save_service.as_ref()).await;
        ui::progress::finish_spinner(&spinner, "submit");

        let outcome = result?;
        self.output_formatter.print_save_outcome(outcome);
        Ok(outcome)
    }

    /// Fetch and display every stored voucher
    pub async fn load_all(&self, session: &mut VoucherSession) -> Result<usize> {
        self.shutdown.check_shutdown()?;

        let spinner = self.progress_manager.create_spinner("Loading vouchers...");
        let result = session.load_all(self.list_service.as_ref()).await;
        ui::progress::finish_spinner(&spinner, "list");

        let count = result?;
        self.output_formatter.print_voucher_list(session.vouchers());
        Ok(count)
    }

    /// Parse `text`, apply hand edits on top, and submit the result
    pub async fn submit_text(&self, text: &str, edits: &[(Field, String)]) -> Result<SaveOutcome> {
        let mut session = VoucherSession::new();
        session.set_raw_text(text);
        let parsed = session.parse(&self.parser);
        self.output_formatter
            .debug(&format!("Detected platform: {}", parsed.platform_label));

        for (field, value) in edits {
            session.set_field(*field, value)?;
        }

        self.output_formatter.print_record(session.record());
        self.submit(&mut session).await
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn parser(&self) -> &VoucherParser {
        &self.parser
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn shutdown(&self) -> &GracefulShutdown {
        &self.shutdown
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &VouchrError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
