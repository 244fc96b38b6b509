//! Engine configuration and loader factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizkit_core::engine::QuizConfig;
use quizkit_core::traits::QuestionLoader;

use crate::memory::InMemoryLoader;
use crate::paged::PagedFileLoader;

/// Configuration for a question source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// A quiz definition file served from memory.
    Memory { path: PathBuf },
    /// A paged question bank directory.
    Paged { dir: PathBuf },
}

/// `[engine]` section: scoring and navigation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub partial_credit_enabled: bool,
    pub coordinate_tolerance: f64,
    pub allow_out_of_order_submission: bool,
    pub page_window_size: usize,
    pub max_composite_depth: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        let defaults = QuizConfig::default();
        Self {
            partial_credit_enabled: defaults.partial_credit_enabled,
            coordinate_tolerance: defaults.coordinate_tolerance,
            allow_out_of_order_submission: defaults.allow_out_of_order_submission,
            page_window_size: defaults.page_window_size,
            max_composite_depth: defaults.max_composite_depth,
        }
    }
}

/// Top-level quizkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizkitConfig {
    #[serde(default)]
    pub engine: EngineSection,
    /// Question source; commands can also name one explicitly.
    #[serde(default)]
    pub source: Option<SourceConfig>,
    /// Output directory for attempt reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizkit-reports")
}

impl Default for QuizkitConfig {
    fn default() -> Self {
        Self {
            engine: EngineSection::default(),
            source: None,
            output_dir: default_output_dir(),
        }
    }
}

impl QuizkitConfig {
    /// Engine options as the core crate consumes them.
    pub fn engine_config(&self) -> QuizConfig {
        QuizConfig {
            partial_credit_enabled: self.engine.partial_credit_enabled,
            coordinate_tolerance: self.engine.coordinate_tolerance,
            allow_out_of_order_submission: self.engine.allow_out_of_order_submission,
            page_window_size: self.engine.page_window_size,
            max_composite_depth: self.engine.max_composite_depth,
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizkit.toml` in the current directory
/// 2. `~/.config/quizkit/config.toml`
pub fn load_config() -> Result<QuizkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizkitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizkit.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizkitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizkitConfig::default(),
    };

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizkit"))
}

/// Create a loader instance from a source configuration.
pub fn create_loader(source: &SourceConfig) -> Result<Arc<dyn QuestionLoader>> {
    match source {
        SourceConfig::Memory { path } => Ok(Arc::new(InMemoryLoader::from_file(path)?)),
        SourceConfig::Paged { dir } => Ok(Arc::new(PagedFileLoader::open(dir)?)),
    }
}
