//! Configuration management for mdtex.
//!
//! Parses `mdtex.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `document.title`
//! - `document.author`
//! - `document.date`
//! - `compile.engine`
//! - `compile.output_dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override document title.
    pub title: Option<String>,
    /// Override document author.
    pub author: Option<String>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override compile enabled flag.
    pub compile: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdtex.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Title page metadata.
    pub document: DocumentConfig,
    /// Page layout.
    pub layout: LayoutConfig,
    /// Renderer options.
    pub render: RenderConfig,
    /// Compile configuration (paths are relative strings from TOML).
    compile: CompileConfigRaw,

    /// Resolved compile configuration (set after loading).
    #[serde(skip)]
    pub compile_resolved: CompileConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Title page configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Document title. Commands pick their own default when unset.
    pub title: Option<String>,
    /// Document author.
    pub author: String,
    /// `"today"`, `""` for no date, or literal text.
    pub date: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: None,
            author: "${USER:-unknown}".to_owned(),
            date: "today".to_owned(),
        }
    }
}

/// Page layout configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// `geometry` paper name.
    pub paper: String,
    /// `geometry` margin.
    pub margin: String,
    /// Add PDF bookmarks for the cover and the body.
    pub outline: bool,
    /// Paragraph spacing length.
    pub parskip: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paper: "a4paper".to_owned(),
            margin: "1in".to_owned(),
            outline: false,
            parskip: None,
        }
    }
}

/// Renderer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Width passed to `\includegraphics`.
    pub image_width: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: "0.8\\linewidth".to_owned(),
        }
    }
}

/// Raw compile configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CompileConfigRaw {
    engine: Option<String>,
    enabled: Option<bool>,
    output_dir: Option<String>,
}

/// Resolved compile configuration with absolute paths.
#[derive(Debug)]
pub struct CompileConfig {
    /// LaTeX engine executable.
    pub engine: String,
    /// Whether rendered documents are compiled to PDF.
    pub enabled: bool,
    /// Directory for generated `.tex` and `.pdf` files.
    pub output_dir: PathBuf,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            engine: "pdflatex".to_owned(),
            enabled: false,
            output_dir: PathBuf::from("build"),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`document.author`").
        field: String,
        /// Error message (e.g., "${`USER`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdtex.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// an environment variable is missing or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            let mut config = Self::default_with_cwd();
            config.expand_env_vars()?;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(title) = &settings.title {
            self.document.title = Some(title.clone());
        }
        if let Some(author) = &settings.author {
            self.document.author.clone_from(author);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.compile_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(compile) = settings.compile {
            self.compile_resolved.enabled = compile;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            document: DocumentConfig::default(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
            compile: CompileConfigRaw::default(),
            compile_resolved: CompileConfig {
                output_dir: base.join("build"),
                ..CompileConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.layout.paper, "layout.paper")?;
        require_non_empty(&self.layout.margin, "layout.margin")?;
        if let Some(parskip) = &self.layout.parskip {
            require_non_empty(parskip, "layout.parskip")?;
        }
        require_non_empty(&self.render.image_width, "render.image_width")?;
        require_non_empty(&self.compile_resolved.engine, "compile.engine")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(title) = &self.document.title {
            self.document.title = Some(expand::expand_env(title, "document.title")?);
        }
        self.document.author = expand::expand_env(&self.document.author, "document.author")?;
        self.document.date = expand::expand_env(&self.document.date, "document.date")?;

        if let Some(engine) = &self.compile.engine {
            self.compile.engine = Some(expand::expand_env(engine, "compile.engine")?);
        }
        if let Some(output_dir) = &self.compile.output_dir {
            self.compile.output_dir = Some(expand::expand_env(output_dir, "compile.output_dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = CompileConfig::default();
        self.compile_resolved = CompileConfig {
            engine: self.compile.engine.clone().unwrap_or(defaults.engine),
            enabled: self.compile.enabled.unwrap_or(defaults.enabled),
            output_dir: config_dir.join(self.compile.output_dir.as_deref().unwrap_or("build")),
        };
    }
}
