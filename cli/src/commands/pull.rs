use anyhow::{Context, Result};
use model_fetch_core::{Config, DownloadRecord, DownloadRegistry, ModelDownloader, SourceType};
use std::path::PathBuf;

pub async fn execute(
    source: SourceType,
    uri: &str,
    dir: Option<PathBuf>,
    name: Option<String>,
) -> Result<()> {
    let config = Config::load()?;

    let name = match name {
        Some(name) => name,
        None => DownloadRecord::name_from_uri(uri)
            .with_context(|| format!("Could not derive a model name from '{}', use --name", uri))?,
    };
    let model_dir = dir.unwrap_or_else(|| config.models_dir().join(&name));

    if let Some(parent) = model_dir.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }

    println!("Pulling {} model: {}", source, uri);

    // Git and AzCopy run as blocking child processes
    let downloader = ModelDownloader::from_config(&config);
    let task_uri = uri.to_string();
    let task_dir = model_dir.clone();
    let metadata = tokio::task::spawn_blocking(move || {
        downloader.download(source, &task_uri, &task_dir)
    })
    .await
    .context("Download task panicked")??;

    let mut registry = DownloadRegistry::load()?;
    registry.add(DownloadRecord {
        name: name.clone(),
        source,
        uri: uri.to_string(),
        path: model_dir.clone(),
        metadata: metadata.clone(),
    })?;

    println!("\nModel downloaded successfully!");
    println!("  Name: {}", name);
    println!("  Path: {:?}", model_dir);
    println!("{}", serde_json::to_string_pretty(&metadata)?);

    Ok(())
}
