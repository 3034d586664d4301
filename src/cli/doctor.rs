//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use memdex::config::MemdexConfig;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &MemdexConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `memdex index` to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let index = super::open_index(config).context("failed to open database (may be corrupt)")?;
    let report = index.health().context("failed to run health check")?;

    println!("memdex Health Report");
    println!("====================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("sqlite-vec:        {}", report.sqlite_vec_version);
    println!(
        "Embedding model:   {}",
        report.embedding_model.as_deref().unwrap_or("(not set)")
    );
    println!();
    println!("Row counts:");
    println!("  Chunks:          {}", report.chunk_count);
    println!("  Embeddings:      {}", report.embedding_count);
    if report.orphaned_embeddings > 0 {
        println!("  Orphaned:        {}  WARNING", report.orphaned_embeddings);
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
    }
    println!(
        "FTS index:         {}",
        if report.fts_ok { "PASSED" } else { "FAILED" }
    );

    if !report.integrity_ok || !report.fts_ok {
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup of {}", db_path.display());
        println!("  2. Or rebuild from the memory files:");
        println!("     memdex reset --yes && memdex index");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
