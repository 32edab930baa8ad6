use anyhow::Result;
use model_fetch_core::Config;

pub async fn execute(key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = Config::load()?;

    match (key, value) {
        // Show all config
        (None, None) => {
            println!("Configuration file: {:?}\n", Config::config_path()?);
            println!("[tools]");
            println!("  git = \"{}\"", config.tools.git);
            println!("  azcopy = \"{}\"", config.tools.azcopy);
            println!();
            println!("[storage]");
            println!("  models_dir = {:?}", config.storage.models_dir.display().to_string());
        }

        // Get a specific key
        (Some(key), None) => {
            println!("{}", config.get(key)?);
        }

        // Set a specific key
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }

        _ => unreachable!(),
    }

    Ok(())
}
