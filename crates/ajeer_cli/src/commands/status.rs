//! Status command
//!
//! Usage: ajeer status

use ajeer_core::{core_version, StorageConfig, Stores};

/// Print the active backend and where local data lives.
pub fn execute(config: &StorageConfig, stores: &Stores) -> Result<(), Box<dyn std::error::Error>> {
    println!("version={}", core_version());
    println!("backend={}", stores.mode().as_str());
    match &config.data_dir {
        Some(dir) => println!("local_store={}", dir.display()),
        None => println!("local_store=memory"),
    }
    Ok(())
}
