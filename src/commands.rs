use crate::variables::Variables;
use std::collections::HashMap;

/// Syntax rows shown by `help` ahead of the registered commands.
const USAGE: [(&str, &str); 3] = [
    (
        "<var> = <value>",
        "Declare variable (e.g., name = 'John', age = 25, active = True)",
    ),
    ("<var>", "Display variable value"),
    ("<expression>", "Evaluate math expression (e.g., 2 + 3 * 4)"),
];

/// What a built-in command asks the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Text(String),
    ClearScreen,
    /// Show the registry's help listing
    Help,
}

pub type CommandFn = Box<dyn Fn(&Variables) -> CommandOutput + Send + Sync>;

pub struct CommandRegistry {
    commands: HashMap<String, CommandInfo>,
    order: Vec<String>,
}

pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub handler: CommandFn,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
            order: Vec::new(),
        };

        registry.register_builtin_commands();
        registry
    }

    /// Commands are keyed by their lowercase name. Re-registering a name
    /// replaces the handler but keeps its place in the listing.
    pub fn register_command(&mut self, info: CommandInfo) {
        let key = info.name.to_lowercase();
        if !self.commands.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.commands.insert(key, info);
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    /// Run `name` if it is registered. Lookup ignores case.
    pub fn execute_command(&self, name: &str, variables: &Variables) -> Option<CommandOutput> {
        self.commands
            .get(&name.to_lowercase())
            .map(|cmd| (cmd.handler)(variables))
    }

    /// Registered commands in registration order.
    pub fn list_commands(&self) -> Vec<&CommandInfo> {
        self.order
            .iter()
            .filter_map(|key| self.commands.get(key))
            .collect()
    }

    pub fn help_text(&self) -> String {
        let mut lines = vec!["Available commands:".to_string()];
        lines.extend(USAGE.iter().map(|(usage, description)| help_row(usage, description)));
        lines.extend(
            self.list_commands()
                .iter()
                .map(|cmd| help_row(&cmd.name, &cmd.description)),
        );
        lines.join("\n")
    }

    fn register_builtin_commands(&mut self) {
        self.register_command(CommandInfo {
            name: "vars".to_string(),
            description: "List all declared variables".to_string(),
            handler: Box::new(|variables| {
                if variables.is_empty() {
                    return CommandOutput::Text("No variables declared".to_string());
                }
                let listing: Vec<String> = variables
                    .iter()
                    .map(|(name, value)| format!("{} = {}", name, value.to_repr()))
                    .collect();
                CommandOutput::Text(listing.join("\n"))
            }),
        });

        self.register_command(CommandInfo {
            name: "clear".to_string(),
            description: "Clear terminal output".to_string(),
            handler: Box::new(|_| CommandOutput::ClearScreen),
        });

        self.register_command(CommandInfo {
            name: "help".to_string(),
            description: "Show this help message".to_string(),
            handler: Box::new(|_| CommandOutput::Help),
        });
    }
}

fn help_row(usage: &str, description: &str) -> String {
    format!("{:<19}- {}", usage, description)
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
