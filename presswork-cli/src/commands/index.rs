//! Index listing command.

use super::build::load_config;
use anyhow::{Context, Result};
use presswork_core::{IndexState, IndexStore};
use std::path::Path;

/// Print the records of the article index
pub fn list_index(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let store = IndexStore::new(config.index_path());

    let loaded = store.load();
    match &loaded.state {
        IndexState::Corrupt(reason) => {
            tracing::warn!("Index {:?} is not valid JSON: {}", store.path(), reason)
        }
        IndexState::NotArray => {
            tracing::warn!("Index {:?} does not hold a JSON array", store.path())
        }
        IndexState::Absent => tracing::info!("No index at {:?}", store.path()),
        IndexState::Empty | IndexState::Loaded => {}
    }

    let records = store.records();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to serialize index")?
        );
        return Ok(());
    }

    for record in &records {
        let tags = if record.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", record.tags.join(", "))
        };
        println!(
            "{}  {}  {} ({}){}",
            record.date, record.filename, record.title, record.author, tags
        );
    }

    Ok(())
}
