use crate::history::{Entry, EntryKind};
use nu_ansi_term::{Color, Style};
use serde::{Deserialize, Serialize};

/// Colour scheme used to draw the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    /// Neutral text with red errors
    #[default]
    Classic,
    /// Green-on-black terminal look
    Minimalist,
    /// No escape sequences at all
    Plain,
}

impl Skin {
    pub fn entry_style(self, kind: EntryKind) -> Style {
        match (self, kind) {
            (Skin::Plain, _) => Style::new(),
            (Skin::Classic, EntryKind::Input) => Style::new().bold(),
            (Skin::Classic, EntryKind::Output) => Style::new(),
            (Skin::Classic, EntryKind::Error) => Color::Red.normal(),
            (Skin::Minimalist, EntryKind::Input) => Color::Green.normal(),
            (Skin::Minimalist, EntryKind::Output) => Color::LightGreen.normal(),
            (Skin::Minimalist, EntryKind::Error) => Color::LightRed.normal(),
        }
    }

    pub fn header_style(self) -> Style {
        match self {
            Skin::Plain => Style::new(),
            Skin::Classic => Style::new().dimmed(),
            Skin::Minimalist => Color::Green.underline(),
        }
    }

    pub fn prompt_style(self) -> Style {
        match self {
            Skin::Plain => Style::new(),
            Skin::Classic => Color::Cyan.bold(),
            Skin::Minimalist => Color::Green.bold(),
        }
    }

    /// Render one entry; inputs are drawn behind `prompt`.
    pub fn render_entry(self, entry: &Entry, prompt: &str) -> String {
        let style = self.entry_style(entry.kind);
        match entry.kind {
            EntryKind::Input => format!(
                "{}{}",
                self.prompt_style().paint(prompt),
                style.paint(entry.text.as_str())
            ),
            _ => style.paint(entry.text.as_str()).to_string(),
        }
    }

    pub fn render_header(self, header: &str) -> String {
        self.header_style().paint(header).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_skin_has_no_escapes() {
        let line = Skin::Plain.render_entry(&Entry::input("vars"), "$ ");
        assert_eq!(line, "$ vars");
        let line = Skin::Plain.render_entry(&Entry::error("Command not found: x y"), "$ ");
        assert_eq!(line, "Command not found: x y");
    }

    #[test]
    fn test_coloured_skins_wrap_text() {
        let line = Skin::Minimalist.render_entry(&Entry::error("boom"), "$ ");
        assert!(line.contains("boom"));
        assert!(line.starts_with('\u{1b}'));
        assert_ne!(
            Skin::Classic.entry_style(EntryKind::Error),
            Skin::Classic.entry_style(EntryKind::Output)
        );
    }

    #[test]
    fn test_skin_names_deserialize() {
        let skin: Skin = serde_json::from_str("\"minimalist\"").unwrap();
        assert_eq!(skin, Skin::Minimalist);
    }
}
