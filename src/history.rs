use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Input,
    Output,
    Error,
}

/// One rendered line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    pub text: String,
}

impl Entry {
    pub fn input<S: Into<String>>(text: S) -> Self {
        Self {
            kind: EntryKind::Input,
            text: text.into(),
        }
    }

    pub fn output<S: Into<String>>(text: S) -> Self {
        Self {
            kind: EntryKind::Output,
            text: text.into(),
        }
    }

    pub fn error<S: Into<String>>(text: S) -> Self {
        Self {
            kind: EntryKind::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Input => write!(f, "{}{}", crate::PROMPT, self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// Step the recall cursor towards older commands.
///
/// Returns the new cursor and the text for the input field. `None` text
/// means the input field stays as it is.
pub fn recall_previous(
    cursor: Option<usize>,
    commands: &[String],
) -> (Option<usize>, Option<String>) {
    if commands.is_empty() {
        return (cursor, None);
    }
    let index = match cursor {
        None => commands.len() - 1,
        Some(i) => i.saturating_sub(1).min(commands.len() - 1),
    };
    (Some(index), Some(commands[index].clone()))
}

/// Step the recall cursor towards newer commands. Stepping past the newest
/// command ends the recall and empties the input field.
pub fn recall_next(cursor: Option<usize>, commands: &[String]) -> (Option<usize>, Option<String>) {
    match cursor {
        None => (None, None),
        Some(i) if i + 1 >= commands.len() => (None, Some(String::new())),
        Some(i) => (Some(i + 1), Some(commands[i + 1].clone())),
    }
}

/// Submitted lines plus the recall cursor used by Up/Down navigation.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    commands: Vec<String>,
    cursor: Option<usize>,
    max_entries: usize,
}

impl CommandHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            commands: Vec::new(),
            cursor: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a submitted line and end any recall in progress.
    pub fn push(&mut self, line: impl Into<String>) {
        self.commands.push(line.into());
        if self.commands.len() > self.max_entries {
            let overflow = self.commands.len() - self.max_entries;
            self.commands.drain(..overflow);
        }
        self.cursor = None;
    }

    pub fn recall_previous(&mut self) -> Option<String> {
        let (cursor, text) = recall_previous(self.cursor, &self.commands);
        self.cursor = cursor;
        text
    }

    pub fn recall_next(&mut self) -> Option<String> {
        let (cursor, text) = recall_next(self.cursor, &self.commands);
        self.cursor = cursor;
        text
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(crate::MAX_HISTORY_ENTRIES)
    }
}
