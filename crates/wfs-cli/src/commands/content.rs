//! File content commands: cat, write and append

use std::io::{Read, Write};

use colored::Colorize;
use wfs_fs::{FileSystem, Source};

use crate::error::Result;

/// Write a file's bytes to stdout
pub async fn run_cat(fs: &FileSystem, path: &str) -> Result<()> {
    let data = fs.read_file(path).await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}

/// Replace a file's content
pub async fn run_write(fs: &FileSystem, path: &str, content: Option<String>, base64: bool) -> Result<()> {
    let source = source_from(content, base64)?;
    fs.write_file(path, source).await?;
    eprintln!("{} {}", "wrote".green(), path);
    Ok(())
}

/// Append to a file, creating it if needed
pub async fn run_append(fs: &FileSystem, path: &str, content: Option<String>, base64: bool) -> Result<()> {
    let source = source_from(content, base64)?;
    fs.append_file(path, source).await?;
    eprintln!("{} {}", "appended".green(), path);
    Ok(())
}

/// Content from the argument, or stdin when absent.
fn source_from(content: Option<String>, base64: bool) -> Result<Source> {
    let source = match (content, base64) {
        (Some(text), true) => Source::Base64(text.trim().to_string()),
        (Some(text), false) => Source::Text(text),
        (None, true) => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Source::Base64(text.trim().to_string())
        }
        (None, false) => {
            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data)?;
            Source::from(data)
        }
    };
    Ok(source)
}
