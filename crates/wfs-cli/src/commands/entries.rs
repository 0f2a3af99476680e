//! Entry commands: ls, mkdir, rm, stat and url

use colored::Colorize;
use serde_json::json;
use wfs_fs::{FileSystem, MakeDirectoryOptions, UrlOptions};

use crate::error::Result;

/// List a directory, directories first
pub async fn run_ls(fs: &FileSystem, path: &str, json: bool) -> Result<()> {
    let mut items = fs.list_directory(path).await?;
    items.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.path.cmp(&b.path))
    });

    if json {
        let entries: Vec<_> = items
            .iter()
            .map(|item| json!({ "path": item.path.as_str(), "kind": item.kind.to_string() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("{}", "(empty)".dimmed());
    }
    for item in items {
        if item.is_directory() {
            println!("{}/", item.path.as_str().blue().bold());
        } else {
            println!("{}", item.path);
        }
    }
    Ok(())
}

pub async fn run_mkdir(fs: &FileSystem, path: &str, parents: bool) -> Result<()> {
    fs.make_directory(path, MakeDirectoryOptions { create_parents: parents })
        .await?;
    eprintln!("{} {}", "created".green(), path);
    Ok(())
}

/// Remove a file, an empty directory, or with `recursive` a whole tree
pub async fn run_rm(fs: &FileSystem, path: &str, recursive: bool) -> Result<()> {
    let entry = fs.resolve(path).await?;
    if entry.is_file() {
        fs.remove_file(path).await?;
    } else if recursive {
        fs.remove_directory_all(path).await?;
    } else {
        fs.remove_directory(path).await?;
    }
    eprintln!("{} {}", "removed".green(), path);
    Ok(())
}

pub async fn run_stat(fs: &FileSystem, path: &str, json: bool) -> Result<()> {
    let stats = fs.stat_entry(path).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let kind = if stats.is_file() { "file" } else { "directory" };
    println!("{:<10} {}", "path:".dimmed(), path);
    println!("{:<10} {}", "kind:".dimmed(), kind);
    if let Some(size) = stats.size {
        println!("{:<10} {}", "size:".dimmed(), size);
    }
    println!("{:<10} {}", "modified:".dimmed(), stats.modified.to_rfc3339());
    Ok(())
}

pub async fn run_url(fs: &FileSystem, path: &str) -> Result<()> {
    let is_directory = !fs.resolve(path).await?.is_file();
    let url = fs.to_url(path, is_directory, UrlOptions::default()).await?;
    println!("{url}");
    Ok(())
}
