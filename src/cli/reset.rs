//! CLI `reset` command: empty the index after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use memdex::config::MemdexConfig;

/// Remove every indexed file (and with it every chunk and embedding).
pub fn reset(config: &MemdexConfig, yes: bool) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !yes {
        println!("WARNING: This will permanently delete ALL indexed chunks and embeddings.");
        println!("Database: {}", db_path.display());
        print!("\nType YES to confirm: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim() != "YES" {
            bail!("reset cancelled");
        }
    }

    let mut index = super::open_index(config)?;
    let mut chunks = 0;
    let files = index.indexed_files()?;
    for file in &files {
        chunks += index.remove_file(file)?;
    }

    println!("Removed {} file(s), {chunks} chunk(s). Index reset complete.", files.len());
    Ok(())
}
