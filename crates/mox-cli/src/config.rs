//! # CLI Configuration
//!
//! Settings come from three layers, highest first: command-line flags
//! (and their environment variables), the `--config` YAML file, and the
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mox_schema::SchemaCompiler;
use mox_structure::{Extension, StructureRegistry};
use mox_templates::{TemplateEngine, TemplateOptions};
use serde::Deserialize;

/// Contents of a `--config` file. Relative paths resolve against the
/// file's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoxConfig {
    /// Structure document replacing the built-in one.
    #[serde(default)]
    pub structure: Option<PathBuf>,
    /// Extension documents applied in order after loading the structure.
    #[serde(default)]
    pub extensions: Vec<PathBuf>,
    /// Directory of `*.sql.hbs` files overriding the built-in templates.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    /// Per-(type, template) option table replacing the built-in one.
    #[serde(default)]
    pub template_options: Option<PathBuf>,
    /// Where uploaded content referenced by `field:` URLs is stored.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
}

impl MoxConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.structure.iter_mut().for_each(join);
        self.extensions.iter_mut().for_each(join);
        self.template_dir.iter_mut().for_each(join);
        self.template_options.iter_mut().for_each(join);
        self.upload_dir.iter_mut().for_each(join);
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub structure: Option<PathBuf>,
    pub extensions: Vec<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
}

/// Effective settings after layering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub structure: Option<PathBuf>,
    pub extensions: Vec<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub template_options: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(overrides: Overrides, config: MoxConfig) -> Self {
        let mut extensions = config.extensions;
        extensions.extend(overrides.extensions);
        Self {
            structure: overrides.structure.or(config.structure),
            extensions,
            template_dir: overrides.template_dir.or(config.template_dir),
            template_options: config.template_options,
            upload_dir: overrides.upload_dir.or(config.upload_dir),
        }
    }

    /// Load the structure and apply every configured extension.
    pub fn compiler(&self) -> Result<SchemaCompiler> {
        let registry = match &self.structure {
            Some(path) => StructureRegistry::from_path(path)
                .with_context(|| format!("failed to load structure {}", path.display()))?,
            None => StructureRegistry::builtin().context("built-in structure is invalid")?,
        };
        let compiler = SchemaCompiler::new(registry);
        for path in &self.extensions {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read extension {}", path.display()))?;
            let extension = Extension::from_yaml_str(&path.display().to_string(), &text)?;
            compiler
                .mutate(&extension)
                .with_context(|| format!("failed to apply extension {}", path.display()))?;
        }
        Ok(compiler)
    }

    /// Built-in templates, overridden by the template directory if set.
    pub fn template_engine(&self) -> Result<TemplateEngine> {
        let mut engine = TemplateEngine::builtin().context("built-in templates are invalid")?;
        if let Some(path) = &self.template_options {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read template options {}", path.display()))?;
            engine = engine.with_options(TemplateOptions::from_yaml_str(&text)?);
        }
        if let Some(dir) = &self.template_dir {
            let loaded = engine
                .load_directory(dir)
                .with_context(|| format!("failed to load templates from {}", dir.display()))?;
            tracing::info!(dir = %dir.display(), loaded, "loaded template overrides");
        }
        Ok(engine)
    }
}
