pub mod output;
pub mod progress;
pub mod shell;
pub mod signals;

pub use output::{OutputFormatter, OutputMode};
pub use progress::ProgressManager;
pub use shell::{InteractiveShell, ShellCommand};
pub use signals::GracefulShutdown;
