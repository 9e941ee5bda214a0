//! `loresmith doctor` - check the configured backend is reachable.

use super::setup;
use loresmith_core::backend::LlmBackend;

pub async fn run() -> anyhow::Result<()> {
    let config = setup::load_config()?;
    println!("config: {config:?}");

    let backend = setup::build_backend(&config);
    print!("backend '{}' at {} ... ", backend.name(), config.backend.base_url);

    match backend.health_check().await {
        Ok(true) => println!("ok"),
        Ok(false) => println!("unreachable (non-success status)"),
        Err(e) => println!("failed: {e}"),
    }
    Ok(())
}
