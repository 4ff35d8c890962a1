use crate::error::{ShellError, ShellResult};
use crate::skin::Skin;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub display: DisplayConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    pub header: String,
    pub history_file: PathBuf,
    pub max_history_size: usize,
    /// Keep submitted lines across sessions in `history_file`
    pub persist_history: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub skin: Skin,
    pub show_header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: crate::PROMPT.to_string(),
            header: crate::HEADER.to_string(),
            history_file: PathsConfig::default().data_dir.join(crate::HISTORY_FILE),
            max_history_size: crate::MAX_HISTORY_ENTRIES,
            persist_history: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            skin: Skin::Classic,
            show_header: true,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("voidshell"),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("voidshell"),
        }
    }
}

/// Expand `~` and environment variables in a user supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(&raw).as_ref()),
    }
}

impl Config {
    fn default_config_file() -> PathBuf {
        PathsConfig::default().config_dir.join(crate::CONFIG_FILE)
    }

    /// Load configuration from file or fall back to defaults
    pub async fn load(config_path: Option<&Path>) -> ShellResult<Self> {
        let config_file = match config_path {
            Some(path) => expand_path(path),
            None => Self::default_config_file(),
        };

        if config_file.exists() {
            log::debug!("loading config from {}", config_file.display());
            let content = fs::read_to_string(&config_file).await?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ShellError::config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub async fn save(&self, config_path: Option<&Path>) -> ShellResult<()> {
        let config_file = match config_path {
            Some(path) => expand_path(path),
            None => self.paths.config_dir.join(crate::CONFIG_FILE),
        };

        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ShellError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_file, content).await?;
        Ok(())
    }

    /// Write the default config file, refusing to overwrite unless forced
    pub async fn init(&self, config_path: Option<&Path>, force: bool) -> ShellResult<PathBuf> {
        let config_file = match config_path {
            Some(path) => expand_path(path),
            None => self.paths.config_dir.join(crate::CONFIG_FILE),
        };

        if config_file.exists() && !force {
            return Err(ShellError::config(
                "Configuration file already exists. Use --force to overwrite.",
            ));
        }

        self.save(Some(&config_file)).await?;
        Ok(config_file)
    }

    /// Read previously persisted command lines, oldest first
    pub async fn load_history(&self) -> ShellResult<Vec<String>> {
        if !self.shell.persist_history || !self.shell.history_file.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.shell.history_file).await?;
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let skip = lines.len().saturating_sub(self.shell.max_history_size);
        Ok(lines.into_iter().skip(skip).collect())
    }

    /// Append one submitted line to the history file
    pub async fn append_history(&self, line: &str) -> ShellResult<()> {
        if !self.shell.persist_history {
            return Ok(());
        }
        if let Some(parent) = self.shell.history_file.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.shell.history_file)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        Ok(())
    }

    /// Remove the persisted command history
    pub async fn clear_history(&self) -> ShellResult<()> {
        if self.shell.history_file.exists() {
            fs::remove_file(&self.shell.history_file).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.paths.config_dir = dir.to_path_buf();
        config.paths.data_dir = dir.to_path_buf();
        config.shell.history_file = dir.join("history.txt");
        config
    }

    #[tokio::test]
    async fn test_config_creation() {
        let config = Config::default();
        assert_eq!(config.shell.prompt, "$ ");
        assert_eq!(config.display.skin, Skin::Classic);
        assert!(!config.shell.persist_history);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join("config.toml");

        let mut config = config_in(temp_dir.path());
        config.display.skin = Skin::Minimalist;
        config.save(Some(&config_file)).await.unwrap();

        let loaded_config = Config::load(Some(&config_file)).await.unwrap();
        assert_eq!(config.shell.prompt, loaded_config.shell.prompt);
        assert_eq!(loaded_config.display.skin, Skin::Minimalist);
    }

    #[tokio::test]
    async fn test_partial_config_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[display]\nskin = \"minimalist\"\n").unwrap();

        let config = Config::load(Some(&config_file)).await.unwrap();
        assert_eq!(config.display.skin, Skin::Minimalist);
        assert!(config.display.show_header);
        assert_eq!(config.shell.max_history_size, crate::MAX_HISTORY_ENTRIES);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[display]\nskin = 42\n").unwrap();

        let err = Config::load(Some(&config_file)).await.unwrap_err();
        assert!(matches!(err, ShellError::Config { .. }));
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let temp_dir = tempdir().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        let config = config_in(temp_dir.path());

        config.init(Some(&config_file), false).await.unwrap();
        assert!(config.init(Some(&config_file), false).await.is_err());
        assert!(config.init(Some(&config_file), true).await.is_ok());
    }

    #[tokio::test]
    async fn test_history_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let mut config = config_in(temp_dir.path());
        config.shell.persist_history = true;
        config.shell.max_history_size = 2;

        for line in ["a = 1", "a + 1", "vars"] {
            config.append_history(line).await.unwrap();
        }
        assert_eq!(config.load_history().await.unwrap(), vec!["a + 1", "vars"]);

        config.clear_history().await.unwrap();
        assert!(config.load_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_disabled_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let config = config_in(temp_dir.path());
        config.append_history("2 + 2").await.unwrap();
        assert!(!config.shell.history_file.exists());
    }
}
