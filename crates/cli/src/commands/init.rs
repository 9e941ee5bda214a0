//! `loresmith init` - write a default config file.

use loresmith_config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    let dir = AppConfig::config_dir();
    let path = dir.join("config.toml");

    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&dir)?;
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("Wrote default config to {}", path.display());
    println!("Edit it to point at your backend, then run `loresmith doctor`.");
    Ok(())
}
