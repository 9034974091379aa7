use crate::error::{Result, VouchrError};
use crate::record::Field;
use crate::session::{ViewMode, VoucherSession};
use crate::Vouchr;
use console::style;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

const HELP: &str = "\
Form commands:
  paste                  paste a message, finish with a line containing only '.'
  parse                  fill the form from the pasted message
  show                   show the form
  set <field> <value>    edit a field (title, platform, sharedVia, voucherCode, link, expiry)
  clear                  empty the form and the pasted message
  submit                 save the voucher
  list                   get all vouchers
List commands:
  list                   refresh
  back                   return to the form
  help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Paste,
    Parse,
    Show,
    Set { field: Field, value: String },
    Clear,
    Submit,
    List,
    Back,
    Help,
    Quit,
}

impl ShellCommand {
    fn allowed_in(&self, view: ViewMode) -> bool {
        match view {
            ViewMode::Form => *self != ShellCommand::Back,
            ViewMode::List => matches!(
                self,
                ShellCommand::List | ShellCommand::Back | ShellCommand::Help | ShellCommand::Quit
            ),
        }
    }
}

impl FromStr for ShellCommand {
    type Err = VouchrError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (word, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));

        let command = match word.to_lowercase().as_str() {
            "paste" | "p" => ShellCommand::Paste,
            "parse" => ShellCommand::Parse,
            "show" | "form" => ShellCommand::Show,
            "set" => {
                let rest = rest.trim();
                if rest.is_empty() {
                    return Err(VouchrError::Command {
                        message: "usage: set <field> <value>".to_string(),
                    });
                }
                let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                ShellCommand::Set {
                    field: name.parse()?,
                    value: value.trim().to_string(),
                }
            }
            "clear" | "reset" => ShellCommand::Clear,
            "submit" => ShellCommand::Submit,
            "list" | "all" => ShellCommand::List,
            "back" => ShellCommand::Back,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            _ => {
                return Err(VouchrError::Command {
                    message: s.to_string(),
                })
            }
        };

        Ok(command)
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Line-oriented rendition of the voucher form and list screens.
pub struct InteractiveShell<'a> {
    app: &'a Vouchr,
    session: VoucherSession,
    show_prompt: bool,
}

impl<'a> InteractiveShell<'a> {
    pub fn new(app: &'a Vouchr) -> Self {
        Self {
            app,
            session: VoucherSession::new(),
            show_prompt: true,
        }
    }

    pub fn with_prompt(mut self, show_prompt: bool) -> Self {
        self.show_prompt = show_prompt;
        self
    }

    pub fn session(&self) -> &VoucherSession {
        &self.session
    }

    /// Reads commands until `quit`, end of input, or Ctrl+C.
    pub async fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();

        if self.show_prompt {
            self.app.output_formatter().print_header("Voucher Manager");
            println!("{}", HELP);
        }

        loop {
            self.app.shutdown().check_shutdown()?;
            self.prompt()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<ShellCommand>() {
                Ok(command) => command,
                Err(e) => {
                    self.app.handle_error(&e);
                    continue;
                }
            };

            if !command.allowed_in(self.session.view()) {
                self.app.output_formatter().warning(match self.session.view() {
                    ViewMode::List => "You are viewing the list. Type 'back' to return to the form.",
                    ViewMode::Form => "Already on the form.",
                });
                continue;
            }

            if command == ShellCommand::Paste {
                let text = read_block(&mut lines)?;
                let count = text.lines().filter(|l| !l.trim().is_empty()).count();
                self.session.set_raw_text(text);
                self.app.output_formatter().info(&format!(
                    "Captured {} line(s). Type 'parse' to fill the form.",
                    count
                ));
                continue;
            }

            match self.execute(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(VouchrError::Cancelled) => return Err(VouchrError::Cancelled),
                Err(e) => self.app.handle_error(&e),
            }
        }

        Ok(())
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        let output = self.app.output_formatter();

        match command {
            ShellCommand::Parse => {
                if self.session.raw_text().trim().is_empty() {
                    output.info("No message pasted yet. Use 'paste' to add one.");
                }
                let parsed = self.session.parse(self.app.parser());
                output.print_parsed(&parsed);
            }
            ShellCommand::Show => output.print_record(self.session.record()),
            ShellCommand::Set { field, value } => {
                self.session.set_field(field, &value)?;
                output.success(&format!("{} updated", field.label()));
            }
            ShellCommand::Clear => {
                self.session.reset();
                output.info("Form cleared");
            }
            ShellCommand::Submit => {
                self.app.submit(&mut self.session).await?;
            }
            ShellCommand::List => {
                self.app.load_all(&mut self.session).await?;
            }
            ShellCommand::Back => {
                self.session.back();
                output.print_record(self.session.record());
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Paste => {}
        }

        Ok(Flow::Continue)
    }

    fn prompt(&self) -> Result<()> {
        if !self.show_prompt {
            return Ok(());
        }

        let marker = match self.session.view() {
            ViewMode::Form => "form",
            ViewMode::List => "list",
        };
        print!("{} ", style(format!("vouchr[{}]>", marker)).bold());
        io::stdout().flush()?;
        Ok(())
    }
}

/// Lines up to a lone `.` or end of input.
fn read_block<I>(lines: &mut I) -> Result<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut block = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim() == "." {
            break;
        }
        block.push(line);
    }
    Ok(block.join("\n"))
}
