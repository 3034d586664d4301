use anyhow::{bail, Result};

use memdex::config::MemdexConfig;

use crate::SearchMode;

pub struct SearchArgs<'a> {
    pub query: Option<&'a str>,
    pub mode: SearchMode,
    pub vector: Option<&'a str>,
    pub limit: Option<usize>,
    pub json: bool,
}

/// Run a search from the terminal.
pub fn search(config: &MemdexConfig, args: SearchArgs<'_>) -> Result<()> {
    let index = super::open_index(config)?;
    let limit = args.limit.unwrap_or(config.search.default_limit);
    let vector = args.vector.map(super::parse_vector).transpose()?;

    let results = match (args.mode, args.query, vector) {
        (SearchMode::Lexical, Some(query), _) => index.search(query, Some(limit))?,
        (SearchMode::Vector, _, Some(vector)) => index.vector_search(&vector, limit)?,
        (SearchMode::Hybrid, Some(query), Some(vector)) => {
            index.hybrid_search(query, &vector, limit)?
        }
        (SearchMode::Lexical, None, _) => bail!("lexical search needs a query"),
        (SearchMode::Vector, _, None) => bail!("vector search needs --vector"),
        (SearchMode::Hybrid, _, _) => bail!("hybrid search needs a query and --vector"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", results.len());
    for (i, result) in results.iter().enumerate() {
        let similarity = result
            .similarity
            .map(|s| format!(", similarity: {s:.4}"))
            .unwrap_or_default();
        println!(
            "  {}. {} [{}..{}] (rank: {:.4}{similarity})",
            i + 1,
            result.file_path,
            result.start_offset,
            result.end_offset,
            result.rank,
        );
        println!("     {}", super::preview(&result.text, 120));
        println!();
    }

    Ok(())
}
