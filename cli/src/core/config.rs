//! # xpld Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Loads the optional TOML configuration that supplies defaults for
//! `xpld inspect` and `xpld extract`. Command-line flags always take
//! precedence over anything configured here.
//!
//! ## Architecture
//!
//! Configuration sources:
//! 1. `$XPLD_CONFIG`, if set: that file alone is used (`~` and `$VAR` are
//!    expanded in the path).
//! 2. Otherwise, a project-specific `.xpld.toml` in the current directory or
//!    an ancestor (the search stops at a directory containing `.git`),
//!    layered over
//! 3. the user-specific `config.toml` in the platform config directory
//!    (e.g. `~/.config/xpld/config.toml`).
//!
//! Missing files mean built-in defaults. Unknown keys are rejected.
//!
//! ## Examples
//!
//! ```toml
//! [inspect]
//! format = "tree"      # text | json | tree
//! sort = "version"     # name | extension | version | size | atime | ctime | mtime
//! dirs_first = true
//! unit_size = true
//!
//! [extract]
//! preserve_permissions = false
//! ```
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let format = cfg.inspect.format.unwrap_or_default();
//! ```
//!
use crate::commands::inspect::options::{OutputFormat, SortKey};
use crate::core::error::{Result, XpldError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "XPLD_CONFIG";
const PROJECT_CONFIG_FILENAME: &str = ".xpld.toml";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub inspect: InspectConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Defaults for `xpld inspect`. Unset keys fall back to the built-in defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InspectConfig {
    pub format: Option<OutputFormat>,
    pub sort: Option<SortKey>,
    pub color: Option<bool>,
    pub dirs_first: Option<bool>,
    pub unit_size: Option<bool>,
    pub ignore_case: Option<bool>,
    pub all: Option<bool>,
}

/// Defaults for `xpld extract`.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    pub preserve_permissions: Option<bool>,
    pub flatten: Option<bool>,
}

/// # Load Configuration (`load_config`)
///
/// Loads, merges, and validates the configuration for this run.
///
/// ## Errors
///
/// Returns an error if a configuration file exists but cannot be read or
/// parsed, if `$XPLD_CONFIG` names a file that does not exist, or if the
/// merged configuration fails validation.
pub fn load_config() -> Result<Config> {
    let config = match env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        Some(value) => {
            let raw = value.to_string_lossy();
            let expanded = shellexpand::full(&raw)
                .with_context(|| format!("Failed to expand {CONFIG_ENV_VAR}='{raw}'"))?;
            let path = PathBuf::from(expanded.as_ref());
            info!(
                "Loading configuration from ${}: {}",
                CONFIG_ENV_VAR,
                path.display()
            );
            load_config_from_path(&path)?
        }
        None => {
            let user_config = load_user_config()?;
            let project_config = load_project_config()?;
            merge_configs(user_config.unwrap_or_default(), project_config)
        }
    };
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    let Some(proj_dirs) = ProjectDirs::from("com", "xplshn", "xpld") else {
        warn!("Could not determine user config directory.");
        return Ok(None);
    };
    let config_path = proj_dirs.config_dir().join("config.toml");
    if config_path.is_file() {
        info!("Loading user configuration from: {}", config_path.display());
        load_config_from_path(&config_path).map(Some)
    } else {
        debug!(
            "User configuration file not found at {}",
            config_path.display()
        );
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    match find_project_config_path(&current_dir) {
        Some(path) => {
            info!("Loading project configuration from: {}", path.display());
            load_config_from_path(&path).map(Some)
        }
        None => {
            debug!("No {} found in current directory or ancestors.", PROJECT_CONFIG_FILENAME);
            Ok(None)
        }
    }
}

/// Searches `start` and its ancestors for `.xpld.toml`, stopping at the
/// first directory that contains `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let project_config = dir.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if dir.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                dir.display()
            );
            return None;
        }
    }
    None
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content).map_err(|e| {
        anyhow!(XpldError::Config(format!(
            "Failed to parse {}: {}",
            path.display(),
            e.message()
        )))
    })
}

/// Layers `project` over `user`, key by key.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project) = project else {
        return user;
    };
    Config {
        inspect: InspectConfig {
            format: project.inspect.format.or(user.inspect.format),
            sort: project.inspect.sort.or(user.inspect.sort),
            color: project.inspect.color.or(user.inspect.color),
            dirs_first: project.inspect.dirs_first.or(user.inspect.dirs_first),
            unit_size: project.inspect.unit_size.or(user.inspect.unit_size),
            ignore_case: project.inspect.ignore_case.or(user.inspect.ignore_case),
            all: project.inspect.all.or(user.inspect.all),
        },
        extract: ExtractConfig {
            preserve_permissions: project
                .extract
                .preserve_permissions
                .or(user.extract.preserve_permissions),
            flatten: project.extract.flatten.or(user.extract.flatten),
        },
    }
}

fn validate_config(config: &Config) -> Result<()> {
    if config.inspect.format == Some(OutputFormat::Tree) {
        if let Some(sort @ (SortKey::Atime | SortKey::Extension)) = config.inspect.sort {
            return Err(anyhow!(XpldError::Config(format!(
                "inspect.sort = \"{sort}\" cannot be combined with inspect.format = \"tree\""
            ))));
        }
    }
    Ok(())
}
