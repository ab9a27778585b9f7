//! `doctor`: read-only environment diagnostics.
//!
//! Never creates the workspace or the database; every probe reports what
//! it found even when the answer is "missing".

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use xuezh_core::XuezhError;
use xuezh_core::config::{AZURE_KEY_ENV, AZURE_REGION_ENV, config_path};
use xuezh_core::paths::{DB_PATH_ENV, WORKSPACE_DIR_ENV, database_path_hint, workspace_dir};
use xuezh_db::{open_existing_database, schema_migration_count};

use crate::bootstrap::CliConfig;
use crate::envelope::CommandOutput;
use crate::error::CliError;

/// Tools probed on `PATH`.
const TOOLS: [&str; 3] = ["ffmpeg", "edge-tts", "whisper"];

#[derive(Debug, Serialize)]
struct Check {
    name: String,
    ok: bool,
    details: Value,
}

impl Check {
    fn new(name: impl Into<String>, ok: bool, details: Value) -> Self {
        Self {
            name: name.into(),
            ok,
            details,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub async fn handle(config: &CliConfig) -> Result<CommandOutput, CliError> {
    let env = |key: &str| config.var(key);
    let mut checks = Vec::new();

    let workspace = workspace_dir(env).map_err(XuezhError::from)?;
    checks.push(Check::new(
        "workspace.path",
        true,
        json!({
            "path": workspace.display().to_string(),
            "exists": workspace.exists(),
            "override": non_empty(config.var(WORKSPACE_DIR_ENV)),
        }),
    ));

    checks.push(database_check(config).await?);

    let runner = config.runner();
    for tool in TOOLS {
        let path = match runner.ensure_tool(tool).await {
            Ok(path) => path.display().to_string(),
            Err(e) => {
                debug!(tool, error = %e, "Tool not available");
                String::new()
            }
        };
        checks.push(Check::new(
            format!("tool.{tool}"),
            !path.is_empty(),
            json!({ "path": path }),
        ));
    }

    checks.push(Check::new(
        "tool.azure-speech-sdk",
        true,
        json!({ "version": "rest" }),
    ));
    checks.push(azure_check(config));

    Ok(CommandOutput::data(json!({ "checks": checks })))
}

async fn database_check(config: &CliConfig) -> Result<Check, CliError> {
    let path = database_path_hint(|key| config.var(key)).map_err(XuezhError::from)?;
    let exists = path.exists();
    let mut details = json!({
        "path": path.display().to_string(),
        "exists": exists,
        "override": non_empty(config.var(DB_PATH_ENV)),
    });
    if !exists {
        return Ok(Check::new("db.status", false, details));
    }

    let counted = match open_existing_database(&path).await {
        Ok(pool) => {
            let count = schema_migration_count(&pool).await;
            pool.close().await;
            count
        }
        Err(e) => Err(e),
    };
    let ok = match counted {
        Ok(count) => {
            details["schema_migrations"] = json!(count);
            true
        }
        Err(e) => {
            details["error"] = json!(format!("{e:#}"));
            false
        }
    };
    Ok(Check::new("db.status", ok, details))
}

fn azure_check(config: &CliConfig) -> Check {
    let sources = config.azure_sources();
    let env_key = non_empty(config.var(AZURE_KEY_ENV)).is_some();
    let env_region = non_empty(config.var(AZURE_REGION_ENV)).is_some();
    let config_key = sources.config_key.is_some();
    let config_region = sources.config_region.is_some();
    let path = config_path(|key| config.var(key))
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    Check::new(
        "azure.speech.env",
        (env_key || config_key) && (env_region || config_region),
        json!({
            "AZURE_SPEECH_KEY": env_key,
            "AZURE_SPEECH_REGION": env_region,
            "config_key": config_key,
            "config_region": config_region,
            "config_path": path,
        }),
    )
}
