//! Line classification and dispatch.
//!
//! A line is tried, in order, as: empty, assignment, built-in command, bare
//! variable name, expression. Anything left over is reported as an unknown
//! command. The interpreter never touches the caller's variables; an
//! assignment is handed back as [`Outcome::Assigned`] for the session to
//! apply.

use crate::commands::{CommandOutput, CommandRegistry};
use crate::error::ShellError;
use crate::eval::{looks_like_expression, EvaluationEngine};
use crate::objects::ShellObject;
use crate::variables::Variables;
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=([^=].*)$").expect("assignment pattern is valid")
});

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Result of interpreting one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Blank input, nothing to record
    Empty,
    Assigned { name: String, value: ShellObject },
    Output { text: String },
    Error { text: String },
    Cleared,
}

impl Outcome {
    fn error(err: ShellError) -> Self {
        Outcome::Error {
            text: err.to_string(),
        }
    }

    /// Text the session shows for this outcome, if any.
    pub fn rendered_text(&self) -> Option<String> {
        match self {
            Outcome::Assigned { name, value } => Some(format!("{} = {}", name, value.to_repr())),
            Outcome::Output { text } | Outcome::Error { text } => Some(text.clone()),
            Outcome::Empty | Outcome::Cleared => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }
}

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER_RE.is_match(text)
}

/// Split `name = value` into its parts. `name == value` is not an assignment.
pub fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let captures = ASSIGNMENT_RE.captures(line)?;
    let name = captures.get(1)?.as_str();
    let rest = captures.get(2)?.as_str().trim();
    if rest.is_empty() {
        return None;
    }
    Some((name, rest))
}

pub struct Interpreter {
    commands: CommandRegistry,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_commands(CommandRegistry::new())
    }

    pub fn with_commands(commands: CommandRegistry) -> Self {
        Self { commands }
    }

    pub fn evaluate(&self, line: &str, variables: &Variables) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Empty;
        }

        if let Some((name, rest)) = split_assignment(line) {
            let value = ShellObject::parse(rest);
            debug!("assign {} = {:?}", name, value);
            return Outcome::Assigned {
                name: name.to_string(),
                value,
            };
        }

        if let Some(output) = self.commands.execute_command(line, variables) {
            return match output {
                CommandOutput::Text(text) => Outcome::Output { text },
                CommandOutput::ClearScreen => Outcome::Cleared,
                CommandOutput::Help => Outcome::Output {
                    text: self.commands.help_text(),
                },
            };
        }

        if is_identifier(line) {
            return match variables.get(line) {
                Some(value) => Outcome::Output {
                    text: value.to_repr(),
                },
                None => Outcome::error(ShellError::lookup(line)),
            };
        }

        if looks_like_expression(line) {
            match EvaluationEngine::new(variables).evaluate_expression(line) {
                Ok(result) => {
                    return Outcome::Output {
                        text: result.to_display_string(),
                    }
                }
                Err(e) if e.is_recoverable() => debug!("expression {:?} rejected: {}", line, e),
                Err(e) => warn!("expression {:?} failed: {}", line, e),
            }
        }

        Outcome::error(ShellError::not_found(line))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret `line` with the built-in command set.
pub fn evaluate(line: &str, variables: &Variables) -> Outcome {
    Interpreter::new().evaluate(line, variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandInfo;

    fn output(text: &str) -> Outcome {
        Outcome::Output {
            text: text.to_string(),
        }
    }

    fn error(text: &str) -> Outcome {
        Outcome::Error {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("name = 'John'"), Some(("name", "'John'")));
        assert_eq!(split_assignment("x=1"), Some(("x", "1")));
        assert_eq!(split_assignment("_a1 =  True "), Some(("_a1", "True")));
        assert_eq!(split_assignment("x == 1"), None);
        assert_eq!(split_assignment("x =="), None);
        assert_eq!(split_assignment("x = "), None);
        assert_eq!(split_assignment("1x = 2"), None);
        assert_eq!(split_assignment("x != 1"), None);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(evaluate("", &Variables::new()), Outcome::Empty);
        assert_eq!(evaluate("   \t", &Variables::new()), Outcome::Empty);
    }

    #[test]
    fn test_assignment() {
        let outcome = evaluate("age = 25", &Variables::new());
        assert_eq!(
            outcome,
            Outcome::Assigned {
                name: "age".to_string(),
                value: ShellObject::Integer(25)
            }
        );
        assert_eq!(outcome.rendered_text().as_deref(), Some("age = 25"));

        // The right-hand side is a value, not an expression
        let outcome = evaluate("total = 2 + 3", &Variables::new());
        assert_eq!(outcome.rendered_text().as_deref(), Some("total = '2 + 3'"));
    }

    #[test]
    fn test_assignment_wins_over_commands() {
        let outcome = evaluate("vars = 1", &Variables::new());
        assert!(matches!(outcome, Outcome::Assigned { ref name, .. } if name == "vars"));
    }

    #[test]
    fn test_commands_ignore_case() {
        assert_eq!(evaluate("VARS", &Variables::new()), output("No variables declared"));
        assert_eq!(evaluate("Clear", &Variables::new()), Outcome::Cleared);
    }

    #[test]
    fn test_bare_identifier() {
        let vars = Variables::new().with("name", ShellObject::from("John"));
        assert_eq!(evaluate("name", &vars), output("'John'"));
        assert_eq!(evaluate("x", &vars), error("Variable \"x\" not found"));
        // Unbound keyword spellings are still just names
        assert_eq!(evaluate("True", &vars), error("Variable \"True\" not found"));
    }

    #[test]
    fn test_expressions() {
        let vars = Variables::new()
            .with("age", ShellObject::Integer(25))
            .with("name", ShellObject::from("John"));
        assert_eq!(evaluate("2 + 3 * 4", &vars), output("14"));
        assert_eq!(evaluate("age + 5", &vars), output("30"));
        assert_eq!(evaluate("name == 'John'", &vars), output("True"));
        assert_eq!(evaluate("age == 30", &vars), output("False"));
        assert_eq!(evaluate("name + '!'", &vars), output("John!"));
    }

    #[test]
    fn test_fallback() {
        let vars = Variables::new();
        assert_eq!(evaluate("foo bar", &vars), error("Command not found: foo bar"));
        assert_eq!(evaluate("1 / 0", &vars), error("Command not found: 1 / 0"));
        assert_eq!(evaluate("ls -la ~", &vars), error("Command not found: ls -la ~"));
        assert_eq!(evaluate("  x ==  ", &vars), error("Command not found: x =="));
    }

    #[test]
    fn test_deep_nesting_falls_through() {
        let vars = Variables::new();
        for line in [
            format!("{}1", "(".repeat(20_000)),
            format!("{}1", "-".repeat(20_000)),
        ] {
            let expected = error(&format!("Command not found: {}", line));
            assert_eq!(evaluate(&line, &vars), expected);
        }
    }

    #[test]
    fn test_help_lists_custom_commands() {
        let mut commands = CommandRegistry::new();
        commands.register_command(CommandInfo {
            name: "reset".to_string(),
            description: "Forget every variable".to_string(),
            handler: Box::new(|_| CommandOutput::ClearScreen),
        });
        let interpreter = Interpreter::with_commands(commands);

        match interpreter.evaluate("help", &Variables::new()) {
            Outcome::Output { text } => {
                assert!(text.starts_with("Available commands:\n<var> = <value>"));
                assert!(text.ends_with("reset              - Forget every variable"));
            }
            other => panic!("Expected help output, got {:?}", other),
        }
        assert_eq!(interpreter.evaluate("RESET", &Variables::new()), Outcome::Cleared);
    }
}
