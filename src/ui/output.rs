use crate::error::{UserFriendlyError, VouchrError};
use crate::parser::ParsedVoucher;
use crate::record::{Field, VoucherRecord};
use crate::services::SaveOutcome;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static TICKET: Emoji = Emoji("🎟️  ", "# ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Warning, message),
            OutputMode::Json => self.print_json_message("warning", message),
            OutputMode::Plain => println!("WARNING: {}", message),
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &VouchrError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", INFO, style(format!("Suggestion: {}", suggestion)).cyan());
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_save_outcome(&self, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Saved => self.success("Data saved!"),
            SaveOutcome::Duplicate => self.warning("Duplicate voucher code. Not saved."),
        }
    }

    /// Form view of a freshly parsed record.
    pub fn print_parsed(&self, parsed: &ParsedVoucher) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "record",
                "platform_label": parsed.platform_label,
                "record": parsed.record,
                "missing": missing_keys(&parsed.record),
            })),
            _ => {
                self.print_record(&parsed.record);
                self.print_detail("Detected platform", &parsed.platform_label);
            }
        }
    }

    /// Form view: every field on its own line, empty ones marked.
    pub fn print_record(&self, record: &VoucherRecord) {
        if self.mode == OutputMode::Json {
            self.print_json_object(&serde_json::json!({
                "type": "record",
                "record": record,
                "missing": missing_keys(record),
            }));
            return;
        }

        self.print_header("Voucher");
        for field in Field::ALL {
            let value = record.get(field);
            let shown = if value.is_empty() {
                if self.use_colors {
                    style("(empty)").dim().to_string()
                } else {
                    "(empty)".to_string()
                }
            } else {
                value.to_string()
            };
            println!("  {:<13} {}", format!("{}:", field.label()), shown);
        }
    }

    /// List view; an empty list is a notice, not an error.
    pub fn print_voucher_list(&self, vouchers: &[VoucherRecord]) {
        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "vouchers",
                    "count": vouchers.len(),
                    "vouchers": vouchers,
                }));
            }
            OutputMode::Human | OutputMode::Plain => {
                self.print_header("All Vouchers");

                if vouchers.is_empty() {
                    if self.use_colors {
                        println!("{}{}", WARNING, style("No vouchers found.").italic().dim());
                    } else {
                        println!("No vouchers found.");
                    }
                    return;
                }

                for (idx, voucher) in vouchers.iter().enumerate() {
                    if idx > 0 {
                        self.print_separator();
                    }
                    if self.use_colors {
                        println!("{}{}", TICKET, style(voucher.display_title()).bold());
                    } else {
                        println!("Title: {}", voucher.display_title());
                    }
                    println!("  Voucher Code: {}", voucher.voucher_code);
                    println!("  Link:         {}", voucher.link);
                    println!("  Expiry Date:  {}", voucher.expiry);
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{}", style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
            }
            OutputMode::Json => {}
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn print_detail(&self, name: &str, value: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            println!("  {} {}", style(format!("{}:", name)).dim(), style(value).cyan());
        } else {
            println!("  {}: {}", name, value);
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn missing_keys(record: &VoucherRecord) -> Vec<&'static str> {
    record.missing_fields().into_iter().map(Field::key).collect()
}
