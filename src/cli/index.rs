//! CLI `index` and `remove` commands.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use memdex::config::MemdexConfig;

/// Index markdown files. Stored paths are relative to the memory directory
/// when the file lives under it.
pub fn index(config: &MemdexConfig, paths: &[PathBuf], prune: bool) -> Result<()> {
    let memory_dir = config.resolved_memory_dir();
    let roots = if paths.is_empty() {
        vec![memory_dir.clone()]
    } else {
        paths.to_vec()
    };

    let mut files = Vec::new();
    for root in &roots {
        collect_markdown(root, &mut files)
            .with_context(|| format!("failed to scan {}", root.display()))?;
    }
    files.sort();

    let mut index = super::open_index(config)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("##-"),
    );

    let mut chunks = 0usize;
    for file in &files {
        let stored = stored_path(file, &memory_dir);
        pb.set_message(stored.clone());
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        chunks += index.index_file(&stored, &content)?.chunk_ids.len();
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Indexed {} file(s) into {chunks} chunk(s).", files.len());

    if prune {
        let mut pruned = 0;
        for stored in index.indexed_files()? {
            if !memory_dir.join(&stored).exists() {
                index.remove_file(&stored)?;
                pruned += 1;
            }
        }
        println!("Pruned {pruned} file(s) no longer on disk.");
    }

    Ok(())
}

/// Remove one file from the index.
pub fn remove(config: &MemdexConfig, file_path: &str) -> Result<()> {
    let mut index = super::open_index(config)?;
    let removed = index.remove_file(file_path)?;
    if removed == 0 {
        println!("{file_path} is not indexed.");
    } else {
        println!("Removed {removed} chunk(s) for {file_path}.");
    }
    Ok(())
}

fn collect_markdown(path: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if path.is_file() {
        out.push(path.to_path_buf());
        return Ok(());
    }
    for entry in std::fs::read_dir(path)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_markdown(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md")) {
            out.push(path);
        }
    }
    Ok(())
}

/// `file` relative to `memory_dir` with `/` separators, or `file` as given.
fn stored_path(file: &Path, memory_dir: &Path) -> String {
    let relative = file.strip_prefix(memory_dir).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_paths_are_relative() {
        let dir = Path::new("/home/agent/memory");
        assert_eq!(
            stored_path(Path::new("/home/agent/memory/daily/2026-10-01.md"), dir),
            "daily/2026-10-01.md"
        );
        assert_eq!(stored_path(Path::new("notes/todo.md"), dir), "notes/todo.md");
    }

    #[test]
    fn collects_only_markdown() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("daily")).unwrap();
        std::fs::write(tmp.path().join("MEMORY.md"), "root").unwrap();
        std::fs::write(tmp.path().join("daily").join("today.md"), "day").unwrap();
        std::fs::write(tmp.path().join("image.png"), "png").unwrap();

        let mut files = Vec::new();
        collect_markdown(tmp.path(), &mut files).unwrap();
        files.sort();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "md"));
    }
}
