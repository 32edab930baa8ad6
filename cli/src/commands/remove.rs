use anyhow::Result;
use model_fetch_core::fs_utils::remove_path;
use model_fetch_core::DownloadRegistry;

pub async fn execute(model: &str) -> Result<()> {
    let mut registry = DownloadRegistry::load()?;

    match registry.get(model).cloned() {
        Some(info) => {
            if info.path.exists() {
                println!("Removing model files from {:?}...", info.path);
                remove_path(&info.path)?;
            }

            registry.remove(model)?;
            println!("Model '{}' removed.", model);
        }
        None => {
            let matches = registry.similar(model);

            if matches.is_empty() {
                println!("Model '{}' not found.", model);
                println!("\nRun `model-fetch list` to see downloaded models.");
            } else if matches.len() == 1 {
                println!("Did you mean '{}'?", matches[0]);
            } else {
                println!("Model '{}' not found. Similar models:", model);
                for name in matches {
                    println!("  - {}", name);
                }
            }
        }
    }

    Ok(())
}
