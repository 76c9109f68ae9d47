//! Agent preset library: scans a directory for agent `.toml` files.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::agent_config::{AgentConfig, ConfigError};

/// Agent presets found in one directory, sorted by name.
#[derive(Debug, Clone)]
pub struct AgentLibrary {
    agents: Vec<AgentConfig>,
}

fn is_preset_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "toml")
}

impl AgentLibrary {
    /// Loads every `*.toml` preset in `dir`.
    ///
    /// Presets that fail to parse are logged and left out.
    ///
    /// # Errors
    ///
    /// Fails when `dir` cannot be listed or holds no usable preset.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let listing = std::fs::read_dir(dir)
            .map_err(|e| ConfigError::new(format!("Cannot list agents in {}: {}", dir.display(), e)))?;

        let mut agents = Vec::new();
        for path in listing.flatten().map(|entry| entry.path()) {
            if !is_preset_file(&path) {
                continue;
            }
            match AgentConfig::from_file(&path) {
                Ok(agent) => agents.push(agent),
                Err(e) => warn!(preset = %path.display(), error = %e, "Ignoring unreadable preset"),
            }
        }

        if agents.is_empty() {
            return Err(ConfigError::new(format!(
                "{} holds no usable agent presets",
                dir.display()
            )));
        }
        agents.sort_by(|a, b| a.name().cmp(b.name()));
        debug!(names = ?agents.iter().map(|a| a.name()).collect::<Vec<_>>(), "Presets loaded");
        info!(count = agents.len(), "Agent library ready");
        Ok(Self { agents })
    }

    /// Scans [`AgentLibrary::default_config_dir`].
    #[instrument]
    pub fn scan_default() -> Result<Self, ConfigError> {
        Self::scan(Self::default_config_dir())
    }

    /// Default agent directory.
    ///
    /// Resolution order:
    /// 1. `$STRICTLY_CODENAMES_AGENTS`
    /// 2. `$XDG_CONFIG_HOME/strictly_codenames/agents`
    /// 3. `./agents`
    pub fn default_config_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("STRICTLY_CODENAMES_AGENTS") {
            return PathBuf::from(dir);
        }
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("strictly_codenames").join("agents");
        }
        PathBuf::from("agents")
    }

    /// All loaded agents, sorted by name.
    pub fn agents(&self) -> &[AgentConfig] {
        &self.agents
    }

    /// Looks up an agent by name, ignoring case.
    pub fn get_by_name(&self, name: &str) -> Option<&AgentConfig> {
        self.agents
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Resolves `name` to a library agent, or loads it as a file path.
    #[instrument(skip(self))]
    pub fn resolve(&self, name: &str) -> Result<AgentConfig, ConfigError> {
        if let Some(agent) = self.get_by_name(name) {
            return Ok(agent.clone());
        }
        let path = Path::new(name);
        if path.is_file() {
            return AgentConfig::from_file(path);
        }
        Err(ConfigError::new(format!(
            "Unknown agent '{}' (available: {})",
            name,
            self.names().join(", ")
        )))
    }

    /// Names of all loaded agents.
    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name().as_str()).collect()
    }

    /// Number of loaded agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are loaded.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
