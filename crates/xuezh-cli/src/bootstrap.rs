//! CLI bootstrap - the composition root.
//!
//! This module is the only place where infrastructure is wired together
//! for the CLI adapter:
//! - Workspace, clock and artifact store (via xuezh-core)
//! - Process runner and audio adapters (via xuezh-runtime)
//! - Attempt repository (via xuezh-db)
//!
//! Nothing here touches the filesystem until [`bootstrap`] is called, so
//! read-only commands such as `doctor` can run without creating a workspace.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use xuezh_core::{
    AppConfig, ArtifactStore, AttemptRepository, AudioCommand, AzureCredentialSources, Clock,
    ProcessRunner, Workspace, XuezhError,
};
use xuezh_db::{SqliteAttemptRepository, setup_database};
use xuezh_runtime::SystemProcessRunner;

/// Configuration and environment snapshot for one invocation.
#[derive(Clone)]
pub struct CliConfig {
    /// Parsed `config.toml`, or defaults.
    pub app: AppConfig,
    vars: BTreeMap<String, String>,
    runner: Arc<dyn ProcessRunner>,
}

impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("app", &self.app)
            .field("vars", &self.vars.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl CliConfig {
    /// Snapshot the process environment and load the config file.
    pub fn from_process() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit variables; the process environment is not read.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let app = AppConfig::load(|key| vars.get(key).cloned()).map_err(XuezhError::from)?;
        Ok(Self {
            app,
            vars,
            runner: Arc::new(SystemProcessRunner::new()),
        })
    }

    /// Replace the loaded config file contents.
    #[must_use]
    pub fn with_app_config(mut self, app: AppConfig) -> Self {
        self.app = app;
        self
    }

    /// Replace the process runner used for external tools.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Look up a variable in the snapshot.
    pub fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    /// Backend id for `command`, honoring the explicit flag first.
    pub fn backend(&self, command: AudioCommand, flag: Option<&str>) -> String {
        self.app.resolve_backend(command, flag, |key| self.var(key))
    }

    /// Inline payload budget in bytes.
    pub fn inline_max_bytes(&self) -> usize {
        self.app.inline_max_bytes(|key| self.var(key))
    }

    /// Azure credential pieces from config and environment.
    pub fn azure_sources(&self) -> AzureCredentialSources {
        AzureCredentialSources::collect(&self.app.azure.speech, |key| self.var(key))
    }
}

/// Fully composed context for commands that write to the workspace.
pub struct CliContext {
    pub config: CliConfig,
    pub store: Arc<ArtifactStore>,
    pub runner: Arc<dyn ProcessRunner>,
}

impl CliContext {
    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    pub fn runner(&self) -> &Arc<dyn ProcessRunner> {
        &self.runner
    }

    /// Open (creating and migrating if needed) the attempt database.
    pub async fn attempt_repository(&self) -> Result<Arc<dyn AttemptRepository>> {
        let path = self
            .store
            .workspace()
            .database_path(|key| self.config.var(key))
            .map_err(XuezhError::from)?;
        let pool = setup_database(&path)
            .await
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(Arc::new(SqliteAttemptRepository::new(pool)))
    }
}

/// Bootstrap the workspace-backed part of the CLI.
///
/// Prepares the workspace tree and the clock; the database is opened
/// lazily by the commands that persist attempts.
pub async fn bootstrap(config: &CliConfig) -> Result<CliContext> {
    let workspace = Workspace::from_env(|key| config.var(key)).map_err(XuezhError::from)?;
    let clock = Clock::from_env(|key| config.var(key))?;
    debug!(root = %workspace.root().display(), "Bootstrapped workspace");

    Ok(CliContext {
        config: config.clone(),
        store: Arc::new(ArtifactStore::new(workspace, clock)),
        runner: config.runner(),
    })
}
