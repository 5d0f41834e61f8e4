//! Configuration
//!
//! A [`Config`] is built once per invocation and passed explicitly to the
//! resolver, the rewrite engine and the workflow operations. Sources, later
//! wins:
//!
//! 1. built-in defaults
//! 2. `<config dir>/pr-command/config.toml`
//! 3. `<repo>/.pr-command.toml`
//! 4. `<repo>/branches.ini` (legacy `FEAT_BRANCH=...` lines)
//! 5. `USE_GH_CLI`

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Repository-local config file name
pub const REPO_CONFIG_FILE: &str = ".pr-command.toml";

/// Legacy branch file name
pub const BRANCHES_INI_FILE: &str = "branches.ini";

/// Named long-lived branches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchSchema {
    /// Production branch
    pub production: String,
    /// Homologation (staging) branch
    pub homologation: String,
    /// Development branch
    pub development: String,
}

impl Default for BranchSchema {
    fn default() -> Self {
        Self {
            production: "main".to_string(),
            homologation: "staging".to_string(),
            development: "develop".to_string(),
        }
    }
}

impl BranchSchema {
    /// Branch name for a schema key
    pub fn get(&self, key: SchemaKey) -> &str {
        match key {
            SchemaKey::Production => &self.production,
            SchemaKey::Homologation => &self.homologation,
            SchemaKey::Development => &self.development,
        }
    }
}

/// Key into a [`BranchSchema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKey {
    /// `production`
    Production,
    /// `homologation`
    Homologation,
    /// `development`
    Development,
}

/// Kind of change a working branch carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    /// New feature
    Feat,
    /// Bug fix
    Fix,
    /// Production hotfix
    Hotfix,
    /// Release preparation
    Release,
}

impl BranchType {
    /// Prefix used in branch names
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Hotfix => "hotfix",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feat" | "feature" => Ok(Self::Feat),
            "fix" | "bugfix" => Ok(Self::Fix),
            "hotfix" => Ok(Self::Hotfix),
            "release" => Ok(Self::Release),
            other => Err(Error::InvalidInput(format!(
                "unknown branch type '{other}' (expected feat, fix, hotfix or release)"
            ))),
        }
    }
}

/// Where a branch type starts from and merges into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMappingItem {
    /// Schema branch new branches are cut from
    pub origin: SchemaKey,
    /// Schema branch PRs target
    pub target: SchemaKey,
}

/// Branch type → schema mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchMapping {
    /// `feat/*` branches
    pub feat: BranchMappingItem,
    /// `fix/*` branches
    pub fix: BranchMappingItem,
    /// `hotfix/*` branches
    pub hotfix: BranchMappingItem,
    /// `release/*` branches
    pub release: BranchMappingItem,
}

impl Default for BranchMapping {
    fn default() -> Self {
        let homologation = BranchMappingItem {
            origin: SchemaKey::Homologation,
            target: SchemaKey::Homologation,
        };
        Self {
            feat: homologation,
            fix: homologation,
            hotfix: BranchMappingItem {
                origin: SchemaKey::Production,
                target: SchemaKey::Production,
            },
            release: BranchMappingItem {
                origin: SchemaKey::Homologation,
                target: SchemaKey::Production,
            },
        }
    }
}

impl BranchMapping {
    /// Mapping entry for a branch type
    pub const fn get(&self, branch_type: BranchType) -> BranchMappingItem {
        match branch_type {
            BranchType::Feat => self.feat,
            BranchType::Fix => self.fix,
            BranchType::Hotfix => self.hotfix,
            BranchType::Release => self.release,
        }
    }
}

/// Which PR gateway implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// `gh` CLI
    #[default]
    Cli,
    /// GitHub REST API
    Api,
}

impl GatewayKind {
    /// Interpret the `USE_GH_CLI` flag. Unset leaves the choice alone.
    pub fn from_env_flag(value: Option<&str>) -> Option<Self> {
        value.map(|v| {
            if v.trim().eq_ignore_ascii_case("true") {
                Self::Cli
            } else {
                Self::Api
            }
        })
    }
}

/// Card/ticket link settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardLinkConfig {
    /// Base URL of the tracker, e.g. `https://tracker.example.com`
    pub website: Option<String>,
    /// Path appended to `website`, containing `{cardId}`
    pub path_template: Option<String>,
    /// Regex extracting the card id from a branch name
    pub branch_card_id_pattern: Option<String>,
}

/// Explicit configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Long-lived branches
    pub branch_schema: BranchSchema,
    /// Branch type mapping
    pub branch_mapping: BranchMapping,
    /// Remote used for fetch/push and remote ref lookups
    pub remote: String,
    /// PR gateway implementation
    pub gateway: GatewayKind,
    /// Card link inference
    pub card_links: CardLinkConfig,
    /// Preferred language for generated PR text
    pub language: Option<String>,
    /// Branches protected in addition to the schema
    pub extra_protected: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            branch_schema: BranchSchema::default(),
            branch_mapping: BranchMapping::default(),
            remote: "origin".to_string(),
            gateway: GatewayKind::default(),
            card_links: CardLinkConfig::default(),
            language: None,
            extra_protected: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration for a repository root
    pub fn load(repo_root: &Path) -> Result<Self> {
        let mut config = match user_config_path() {
            Some(path) if path.is_file() => Self::from_toml_file(&path)?,
            _ => Self::default(),
        };

        let repo_file = repo_root.join(REPO_CONFIG_FILE);
        if repo_file.is_file() {
            config = Self::from_toml_file(&repo_file)?;
        }

        let ini = repo_root.join(BRANCHES_INI_FILE);
        if ini.is_file() {
            let content = std::fs::read_to_string(&ini)?;
            config.apply_branches_ini(&content);
        }

        if let Some(kind) = GatewayKind::from_env_flag(std::env::var("USE_GH_CLI").ok().as_deref())
        {
            config.gateway = kind;
        }

        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn from_toml_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Apply legacy `branches.ini` overrides
    pub fn apply_branches_ini(&mut self, content: &str) {
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').to_string();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "HOTFIX_BRANCH" => self.branch_schema.production.clone_from(&value),
                "FEAT_BRANCH" | "BUGFIX_BRANCH" | "RELEASE_BRANCH" => {
                    self.branch_schema.homologation.clone_from(&value);
                }
                "DEV_BRANCH" => self.branch_schema.development.clone_from(&value),
                _ => continue,
            }
            if !self.extra_protected.contains(&value) {
                self.extra_protected.push(value);
            }
        }
    }

    /// Branches on which history must never be rewritten
    pub fn protected_branches(&self) -> BTreeSet<&str> {
        let schema = &self.branch_schema;
        [
            schema.production.as_str(),
            schema.homologation.as_str(),
            schema.development.as_str(),
        ]
        .into_iter()
        .chain(self.extra_protected.iter().map(String::as_str))
        .collect()
    }

    /// Whether `branch` is protected
    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches().contains(branch)
    }

    /// Default base branch for a new branch of `branch_type`
    pub fn origin_branch(&self, branch_type: BranchType) -> &str {
        self.branch_schema
            .get(self.branch_mapping.get(branch_type).origin)
    }

    /// Default PR target for a branch of `branch_type`
    pub fn target_branch(&self, branch_type: BranchType) -> &str {
        self.branch_schema
            .get(self.branch_mapping.get(branch_type).target)
    }
}

/// Location of the per-user config file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pr-command").join("config.toml"))
}
