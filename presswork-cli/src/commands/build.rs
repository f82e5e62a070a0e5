//! Build command implementation.

use anyhow::{bail, Context, Result};
use presswork_core::{Config, SiteBuilder};
use std::path::{Path, PathBuf};

/// Path flags that take precedence over the config file
#[derive(Debug, Default)]
pub struct PathOverrides {
    pub input: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub index: Option<PathBuf>,
}

impl PathOverrides {
    /// Apply overrides; they are relative to the working directory, not the config file
    fn apply(self, config: &mut Config) -> Result<()> {
        let targets = [
            (self.input, &mut config.paths.articles),
            (self.template, &mut config.paths.template),
            (self.output, &mut config.paths.output),
            (self.index, &mut config.paths.index),
        ];
        for (value, slot) in targets {
            if let Some(path) = value {
                *slot = std::path::absolute(&path)
                    .with_context(|| format!("Failed to resolve {:?}", path))?;
            }
        }
        Ok(())
    }
}

/// Render every article and update the index
pub fn build_site(config_path: &Path, overrides: PathOverrides) -> Result<()> {
    let mut config = load_config(config_path)?;
    overrides.apply(&mut config)?;

    tracing::info!(
        "Building {:?} -> {:?}",
        config.articles_dir(),
        config.output_dir()
    );

    let builder = SiteBuilder::new(config);
    let report = builder.build().context("Failed to build articles")?;

    for failure in &report.failures {
        tracing::error!("✗ {}: {}", failure.source.display(), failure.error);
    }

    tracing::info!("✓ Rendered {} pages", report.rendered.len());
    tracing::info!("✓ Index written to {:?}", builder.config().index_path());

    if !report.is_success() {
        bail!(
            "{} of {} articles failed",
            report.failures.len(),
            report.processed()
        );
    }

    Ok(())
}

/// Load the config file, falling back to defaults when it is absent
pub fn load_config(config_path: &Path) -> Result<Config> {
    tracing::debug!("Loading config from {:?}", config_path);
    Config::load_or_default(config_path).context("Failed to load configuration")
}
