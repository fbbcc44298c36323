//! Configuration loading
//!
//! `defaults/minweb.default.toml` is embedded into the library, so the documented defaults
//! and the runtime defaults cannot drift apart. Callers layer their own files and overrides
//! on top through [`Loader`] before deserializing into [`MinwebConfig`].

use crate::minweb::includes::IncludePolicy;
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../../defaults/minweb.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct MinwebConfig {
    pub includes: IncludesConfig,
    pub tangle: TangleConfig,
    pub extract: ExtractConfig,
}

/// Where include directives look for files.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludesConfig {
    pub search_paths: Vec<PathBuf>,
    pub policy: IncludePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TangleConfig {
    pub default_root: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub output_suffix: String,
}

impl ExtractConfig {
    /// Output file used for `section` when none is given.
    pub fn default_output(&self, section: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", section, self.output_suffix))
    }
}

/// Looked for in the working directory when no configuration file is named.
pub const LOCAL_CONFIG: &str = "minweb.toml";

#[derive(Debug, Clone)]
enum UserFile {
    Named(PathBuf),
    Discovered(PathBuf),
}

/// Builds a [`MinwebConfig`] from the embedded defaults, at most one user file, and the
/// overrides given on the command line, later layers winning.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    user_file: Option<UserFile>,
    policy: Option<IncludePolicy>,
    default_root: Option<String>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a configuration file that must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_file = Some(UserFile::Named(path.into()));
        self
    }

    /// Layer `minweb.toml` from `dir`, if there is one.
    pub fn discover_in(mut self, dir: impl AsRef<Path>) -> Self {
        self.user_file = Some(UserFile::Discovered(dir.as_ref().join(LOCAL_CONFIG)));
        self
    }

    pub fn with_policy(mut self, policy: IncludePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_default_root(mut self, root: impl Into<String>) -> Self {
        self.default_root = Some(root.into());
        self
    }

    pub fn build(self) -> Result<MinwebConfig, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        if let Some(user_file) = &self.user_file {
            let (path, required) = match user_file {
                UserFile::Named(path) => (path, true),
                UserFile::Discovered(path) => (path, false),
            };
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }
        let mut config: MinwebConfig = builder.build()?.try_deserialize()?;
        if let Some(policy) = self.policy {
            config.includes.policy = policy;
        }
        if let Some(root) = self.default_root {
            config.tangle.default_root = root;
        }
        Ok(config)
    }
}
