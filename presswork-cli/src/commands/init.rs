//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../assets/presswork.yml.example");
const DEFAULT_TEMPLATE: &str = include_str!("../../assets/newspaper.html");
const SAMPLE_ARTICLE: &str = include_str!("../../assets/welcome.md");

/// Initialize a new presswork project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_if_missing(&root.join("presswork.yml"), DEFAULT_CONFIG)?;
    write_if_missing(&root.join("templates/newspaper.html"), DEFAULT_TEMPLATE)?;
    write_if_missing(&root.join("articles/welcome.md"), SAMPLE_ARTICLE)?;

    println!("✓ presswork initialized in {:?}", root);
    println!("  - Write articles in articles/");
    println!("  - Run `presswork` to render them into news/");
    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{:?} already exists", path);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?}", path);
    Ok(())
}
