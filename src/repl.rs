use crate::config::Config;
use crate::error::{ShellError, ShellResult};
use crate::history::Entry;
use crate::interpreter::Outcome;
use crate::session::Session;
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::queue;
use log::{debug, warn};
use std::io::{self, Write};

/// Single-line input buffer with a caret, counted in characters.
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    chars: Vec<char>,
    caret: usize,
}

impl InputLine {
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Replace the contents and put the caret at the end.
    pub fn set(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.caret = self.chars.len();
    }

    pub fn take(&mut self) -> String {
        let text = self.text();
        self.set("");
        text
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.caret, c);
        self.caret += 1;
    }

    pub fn backspace(&mut self) {
        if self.caret > 0 {
            self.caret -= 1;
            self.chars.remove(self.caret);
        }
    }

    pub fn delete(&mut self) {
        if self.caret < self.chars.len() {
            self.chars.remove(self.caret);
        }
    }

    pub fn left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.caret = (self.caret + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.caret = 0;
    }

    pub fn end(&mut self) {
        self.caret = self.chars.len();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// Nothing visible changed
    Ignored,
    /// The input line changed
    Edited,
    /// A line was submitted to the session
    Submitted(Outcome),
    Exit,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> ShellResult<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| ShellError::terminal(format!("cannot enter raw mode: {}", e)))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal: {}", e);
        }
    }
}

pub struct ReplEngine {
    config: Config,
    session: Session,
    input: InputLine,
}

impl ReplEngine {
    pub fn new(config: Config, session: Session) -> Self {
        Self {
            config,
            session,
            input: InputLine::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input(&self) -> &InputLine {
        &self.input
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Apply one key press to the input line and the session.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Enter => {
                let line = self.input.take();
                KeyAction::Submitted(self.session.submit(&line))
            }
            KeyCode::Up => self.recall(|session| session.recall_previous()),
            KeyCode::Down => self.recall(|session| session.recall_next()),
            KeyCode::Char('c') if ctrl => {
                if self.input.is_empty() {
                    KeyAction::Exit
                } else {
                    self.input.set("");
                    KeyAction::Edited
                }
            }
            KeyCode::Char('d') if ctrl => {
                if self.input.is_empty() {
                    KeyAction::Exit
                } else {
                    KeyAction::Ignored
                }
            }
            KeyCode::Char('l') if ctrl => KeyAction::Submitted(self.session.submit("clear")),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.input.insert(c);
                KeyAction::Edited
            }
            KeyCode::Backspace => self.edit(InputLine::backspace),
            KeyCode::Delete => self.edit(InputLine::delete),
            KeyCode::Left => self.edit(InputLine::left),
            KeyCode::Right => self.edit(InputLine::right),
            KeyCode::Home => self.edit(InputLine::home),
            KeyCode::End => self.edit(InputLine::end),
            _ => KeyAction::Ignored,
        }
    }

    fn recall(&mut self, step: impl FnOnce(&mut Session) -> Option<String>) -> KeyAction {
        match step(&mut self.session) {
            Some(text) => {
                self.input.set(&text);
                KeyAction::Edited
            }
            None => KeyAction::Ignored,
        }
    }

    fn edit(&mut self, op: fn(&mut InputLine)) -> KeyAction {
        op(&mut self.input);
        KeyAction::Edited
    }

    /// The newest `max_lines` transcript lines, styled with the active skin.
    pub fn transcript_lines(&self, max_lines: usize) -> Vec<String> {
        let skin = self.config.display.skin;
        let prompt = &self.config.shell.prompt;
        let lines: Vec<String> = self
            .session
            .entries()
            .iter()
            .flat_map(|entry| {
                entry.text.split('\n').map(move |line| {
                    skin.render_entry(
                        &Entry {
                            kind: entry.kind,
                            text: line.to_string(),
                        },
                        prompt,
                    )
                })
            })
            .collect();
        let skip = lines.len().saturating_sub(max_lines);
        lines.into_iter().skip(skip).collect()
    }

    pub async fn run_interactive(&mut self) -> ShellResult<()> {
        let _raw = RawModeGuard::enable()?;
        let mut stdout = io::stdout();
        self.draw(&mut stdout)?;

        loop {
            let key = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                Event::Resize(_, _) => {
                    self.draw(&mut stdout)?;
                    continue;
                }
                _ => continue,
            };

            match self.handle_key(key) {
                KeyAction::Exit => break,
                KeyAction::Submitted(outcome) => {
                    if outcome != Outcome::Empty {
                        self.persist_last_command().await;
                    }
                    self.draw(&mut stdout)?;
                }
                KeyAction::Edited => {
                    self.queue_input_line(&mut stdout)?;
                    stdout.flush()?;
                }
                KeyAction::Ignored => {}
            }
        }

        queue!(stdout, Print("\r\n"))?;
        stdout.flush()?;
        Ok(())
    }

    async fn persist_last_command(&self) {
        if let Some(line) = self.session.command_history().commands().last() {
            if let Err(e) = self.config.append_history(line).await {
                warn!("could not save history: {}", e);
            }
        }
    }

    fn draw(&self, out: &mut impl Write) -> ShellResult<()> {
        let (_, rows) = terminal::size()?;
        let skin = self.config.display.skin;

        queue!(out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;

        let mut used = 1;
        if self.config.display.show_header {
            queue!(
                out,
                Print(skin.render_header(&self.config.shell.header)),
                Print("\r\n")
            )?;
            used += 1;
        }

        let available = (rows as usize).saturating_sub(used);
        for line in self.transcript_lines(available) {
            queue!(out, Print(line), Print("\r\n"))?;
        }

        self.queue_input_line(out)?;
        out.flush()?;
        debug!("redrew {} entries", self.session.entries().len());
        Ok(())
    }

    fn queue_input_line(&self, out: &mut impl Write) -> ShellResult<()> {
        let skin = self.config.display.skin;
        let prompt = &self.config.shell.prompt;
        let column = prompt.chars().count() + self.input.caret();
        queue!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(skin.prompt_style().paint(prompt.as_str())),
            Print(self.input.text()),
            cursor::MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX))
        )?;
        Ok(())
    }
}
