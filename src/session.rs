use crate::history::{CommandHistory, Entry};
use crate::interpreter::{Interpreter, Outcome};
use crate::variables::Variables;
use log::debug;

/// All state of one terminal session: variables, the visible transcript and
/// the command history used for recall.
pub struct Session {
    interpreter: Interpreter,
    variables: Variables,
    entries: Vec<Entry>,
    history: CommandHistory,
}

impl Session {
    pub fn new() -> Self {
        Self::with_history(CommandHistory::default())
    }

    pub fn with_history(history: CommandHistory) -> Self {
        Self {
            interpreter: Interpreter::new(),
            variables: Variables::new(),
            entries: Vec::new(),
            history,
        }
    }

    /// Interpret one line and record it in the transcript.
    pub fn submit(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        let outcome = self.interpreter.evaluate(line, &self.variables);
        if outcome == Outcome::Empty {
            return outcome;
        }

        self.history.push(line);
        self.entries.push(Entry::input(line));

        match &outcome {
            Outcome::Assigned { name, value } => {
                self.variables.set(name.clone(), value.clone());
            }
            Outcome::Cleared => {
                debug!("clearing {} transcript entries", self.entries.len());
                self.entries.clear();
            }
            _ => {}
        }

        if let Some(text) = outcome.rendered_text() {
            self.entries.push(if outcome.is_error() {
                Entry::error(text)
            } else {
                Entry::output(text)
            });
        }

        outcome
    }

    /// Previous command for the input field, `None` to leave it unchanged.
    pub fn recall_previous(&mut self) -> Option<String> {
        self.history.recall_previous()
    }

    /// Next command for the input field, `None` to leave it unchanged.
    pub fn recall_next(&mut self) -> Option<String> {
        self.history.recall_next()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn command_history(&self) -> &CommandHistory {
        &self.history
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::EntryKind;

    #[test]
    fn test_each_line_gets_input_and_result() {
        let mut session = Session::new();
        session.submit("age = 25");
        session.submit("missing");

        let kinds: Vec<EntryKind> = session.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EntryKind::Input, EntryKind::Output, EntryKind::Input, EntryKind::Error]
        );
        assert_eq!(session.entries()[0].text, "age = 25");
        assert_eq!(session.entries()[1].text, "age = 25");
    }

    #[test]
    fn test_empty_line_records_nothing() {
        let mut session = Session::new();
        assert_eq!(session.submit("   "), Outcome::Empty);
        assert!(session.entries().is_empty());
        assert!(session.command_history().is_empty());
    }

    #[test]
    fn test_clear_keeps_variables_and_history() {
        let mut session = Session::new();
        session.submit("name = 'Alice'");
        session.submit("clear");

        assert!(session.entries().is_empty());
        assert!(session.variables().contains("name"));
        assert_eq!(session.command_history().len(), 2);

        session.submit("name");
        assert_eq!(session.entries()[1], Entry::output("'Alice'"));
    }

    #[test]
    fn test_input_is_trimmed_before_recording() {
        let mut session = Session::new();
        session.submit("  2 + 2  ");
        assert_eq!(session.entries()[0], Entry::input("2 + 2"));
        assert_eq!(session.recall_previous().as_deref(), Some("2 + 2"));
    }
}
