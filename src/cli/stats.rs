use anyhow::Result;

use memdex::config::MemdexConfig;

/// Display index statistics in the terminal.
pub fn stats(config: &MemdexConfig, json: bool) -> Result<()> {
    let index = super::open_index(config)?;
    let response = index.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Memory Index Statistics");
    println!("{}", "=".repeat(40));
    println!("  Files:               {}", response.files);
    println!("  Chunks:              {}", response.chunks);
    println!("  Embedded:            {}", response.embedded_chunks);
    println!("  Pending embeddings:  {}", response.pending_embeddings);
    println!();

    println!(
        "Embedding model:       {}",
        response.embedding_model.as_deref().unwrap_or("(not set)")
    );
    match response.embedding_dimensions.as_slice() {
        [] => println!("Dimensions:            (none stored)"),
        [dims] => println!("Dimensions:            {dims}"),
        many => println!("Dimensions:            {many:?}  WARNING: mixed, re-embed needed"),
    }
    println!("Schema version:        {}", response.schema_version);
    println!("Database size:         {} bytes", response.db_size_bytes);

    if let Some(ref oldest) = response.oldest_indexed {
        println!("Oldest chunk:          {oldest}");
    }
    if let Some(ref newest) = response.newest_indexed {
        println!("Newest chunk:          {newest}");
    }

    Ok(())
}

/// List the chunks an embedding backfill would process.
pub fn pending(config: &MemdexConfig, json: bool) -> Result<()> {
    let index = super::open_index(config)?;
    let ids = index.chunk_ids_without_embeddings()?;

    if json {
        println!("{}", serde_json::to_string(&ids)?);
    } else if ids.is_empty() {
        println!("All chunks have embeddings.");
    } else {
        println!("{} chunk(s) without embeddings:", ids.len());
        for id in ids {
            if let Some(chunk) = index.get_chunk(id)? {
                println!("  {id:>6}  {}  {}", chunk.file_path, super::preview(&chunk.text, 60));
            }
        }
    }
    Ok(())
}
