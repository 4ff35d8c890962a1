pub mod commands;
pub mod config;
pub mod error;
pub mod eval;
pub mod history;
pub mod interpreter;
pub mod objects;
pub mod repl;
pub mod session;
pub mod shell;
pub mod skin;
pub mod variables;

pub use error::{ShellError, ShellResult};
pub use history::{recall_next, recall_previous, CommandHistory, Entry, EntryKind};
pub use interpreter::{evaluate, Interpreter, Outcome};
pub use objects::{parse_value, ShellObject};
pub use session::Session;
pub use shell::Shell;
pub use variables::Variables;

/// voidshell version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const CONFIG_FILE: &str = "config.toml";

/// Default history file name
pub const HISTORY_FILE: &str = "history.txt";

/// Maximum history entries to keep
pub const MAX_HISTORY_ENTRIES: usize = 1000;

/// Prompt drawn in front of input lines
pub const PROMPT: &str = "$ ";

pub const HEADER: &str = "Terminal v1.0 - Type 'help' for commands";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
