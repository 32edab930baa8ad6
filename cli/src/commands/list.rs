use anyhow::Result;
use model_fetch_core::DownloadRegistry;

pub async fn execute() -> Result<()> {
    let registry = DownloadRegistry::load()?;
    let models = registry.list();

    if models.is_empty() {
        println!("No models downloaded.");
        println!("\nRun `model-fetch pull --source <git|azureblob> <uri>` to download a model.");
        return Ok(());
    }

    println!(
        "{:<32} {:<10} {:<12} {:<20} {}",
        "NAME", "SOURCE", "SIZE", "DOWNLOADED (UTC)", "COMMIT"
    );
    println!("{}", "-".repeat(100));

    for model in models {
        let commit = model
            .metadata
            .commit_hash
            .as_deref()
            .map(|h| h.trim_matches(['\'', '"']))
            .map(|h| h.chars().take(12).collect::<String>())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:<10} {:<12} {:<20} {}",
            model.name,
            model.source.as_str(),
            model.metadata.model_size,
            model.metadata.download_time_utc,
            commit
        );
    }

    Ok(())
}
