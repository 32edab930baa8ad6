//! Show recorded download metadata

use anyhow::Result;
use model_fetch_core::fs_utils::{dir_size, format_size};
use model_fetch_core::DownloadRegistry;

pub async fn execute(model: &str) -> Result<()> {
    let registry = DownloadRegistry::load()?;

    match registry.get(model) {
        Some(info) => {
            println!("Model: {}", info.name);
            println!("Source: {}", info.source);
            println!("URI: {}", info.uri);
            println!("Path: {}", info.path.display());
            println!("Downloaded: {} UTC", info.metadata.download_time_utc);
            println!("Size at download: {}", info.metadata.model_size);
            if let Some(commit) = &info.metadata.commit_hash {
                println!("Commit: {}", commit);
            }

            if info.path.exists() {
                let size = dir_size(&info.path)?;
                println!("Size on disk: {}", format_size(size));
            } else {
                println!("Size on disk: (missing)");
            }
        }
        None => {
            eprintln!("Model '{}' not found", model);
            eprintln!();
            eprintln!("Use `model-fetch list` to see downloaded models");
            std::process::exit(1);
        }
    }

    Ok(())
}
