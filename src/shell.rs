use crate::config::{expand_path, Config};
use crate::error::{ShellError, ShellResult};
use crate::history::{CommandHistory, Entry, EntryKind};
use crate::interpreter::Outcome;
use crate::repl::ReplEngine;
use crate::session::Session;
use log::{debug, info};
use std::path::Path;
use tokio::fs;

/// How non-interactive runs print transcript entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Styled with the configured skin
    #[default]
    Text,
    /// One JSON object per entry
    Json,
}

pub struct Shell {
    config: Config,
    session: Session,
    format: OutputFormat,
}

impl Shell {
    pub async fn new(config: Config) -> ShellResult<Self> {
        let mut history = CommandHistory::new(config.shell.max_history_size);
        for line in config.load_history().await? {
            history.push(line);
        }
        debug!("restored {} history lines", history.len());

        Ok(Self {
            config,
            session: Session::with_history(history),
            format: OutputFormat::default(),
        })
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run_repl(self) -> ShellResult<()> {
        info!("starting interactive session");
        let mut repl = ReplEngine::new(self.config, self.session);
        repl.run_interactive().await
    }

    /// Submit one line and return the entries it added to the transcript.
    pub fn submit(&mut self, line: &str) -> (Outcome, Vec<Entry>) {
        let before = self.session.entries().len();
        let outcome = self.session.submit(line);
        let added = match outcome {
            Outcome::Empty | Outcome::Cleared => Vec::new(),
            _ => self.session.entries()[before..].to_vec(),
        };
        (outcome, added)
    }

    /// Run a single line and print its result.
    pub async fn execute_command(&mut self, command: &str) -> ShellResult<Outcome> {
        let (outcome, entries) = self.submit(command);
        if outcome != Outcome::Empty {
            self.config.append_history(command.trim()).await?;
        }
        let results: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| entry.kind != EntryKind::Input)
            .collect();
        self.print_entries(&results)?;
        Ok(outcome)
    }

    /// Run a file line by line. Blank lines and `#` comments are skipped.
    pub async fn execute_script(&mut self, script_path: &Path) -> ShellResult<usize> {
        let script_path = expand_path(script_path);
        let content = fs::read_to_string(&script_path).await?;
        let mut errors = 0;

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (outcome, entries) = self.submit(line);
            if outcome.is_error() {
                debug!("{}:{}: {:?}", script_path.display(), line_num + 1, outcome);
                errors += 1;
            }
            self.print_entries(&entries)?;
        }

        Ok(errors)
    }

    pub fn render_entries(&self, entries: &[Entry]) -> ShellResult<Vec<String>> {
        match self.format {
            OutputFormat::Json => entries
                .iter()
                .map(|entry| serde_json::to_string(entry).map_err(ShellError::from))
                .collect(),
            OutputFormat::Text => {
                let skin = self.config.display.skin;
                Ok(entries
                    .iter()
                    .map(|entry| skin.render_entry(entry, &self.config.shell.prompt))
                    .collect())
            }
        }
    }

    fn print_entries(&self, entries: &[Entry]) -> ShellResult<()> {
        for line in self.render_entries(entries)? {
            println!("{}", line);
        }
        Ok(())
    }
}
