use thiserror::Error;

pub type ShellResult<T> = Result<T, ShellError>;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Terminal error: {message}")]
    Terminal { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Evaluation error: {message}")]
    Eval { message: String },

    #[error("Type error: expected {expected}, found {found}")]
    Type { expected: String, found: String },

    #[error("Variable \"{name}\" not found")]
    Lookup { name: String },

    #[error("Command not found: {line}")]
    NotFound { line: String },
}

impl ShellError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn terminal<S: Into<String>>(message: S) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn eval<S: Into<String>>(message: S) -> Self {
        Self::Eval {
            message: message.into(),
        }
    }

    pub fn type_error<S: Into<String>, T: Into<String>>(expected: S, found: T) -> Self {
        Self::Type {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn lookup<S: Into<String>>(name: S) -> Self {
        Self::Lookup { name: name.into() }
    }

    pub fn not_found<S: Into<String>>(line: S) -> Self {
        Self::NotFound { line: line.into() }
    }

    /// Errors caused by a single input line. The session reports them and
    /// keeps going; the rest come from the environment.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ShellError::Parse { .. }
                | ShellError::Eval { .. }
                | ShellError::Type { .. }
                | ShellError::Lookup { .. }
                | ShellError::NotFound { .. }
        )
    }
}
