//! Push-based chunked writes over a file entry
//!
//! The storage writer reports each mutation through a single listener slot.
//! [`WriteStream`] installs a one-shot listener right before every `write` or
//! `truncate`, awaits the one outcome it delivers, and removes the listener
//! again, turning the event-driven writer into plain async calls.
//!
//! The first access decides how the stream is positioned: at an explicit
//! start offset, at the end of the file in append mode, or at zero after
//! truncating the file. Later accesses reuse the same writer and seek it to
//! the tracked position.

use crate::convert;
use crate::error::{Error, ErrorKind, Result};
use crate::path::LogicalPath;
use crate::resolver::EntryResolver;
use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use wfs_storage::{DirectoryEntry, FileWriter, GetOptions, WriteOutcome};

/// Options for opening a [`WriteStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Create the file if it does not exist.
    pub create: bool,
    /// Position at the end of the existing content instead of truncating.
    pub append: bool,
    /// Position at this offset instead of truncating. Wins over `append`.
    pub start: Option<u64>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            create: true,
            append: false,
            start: None,
        }
    }
}

impl WriteOptions {
    pub fn append() -> Self {
        Self {
            append: true,
            ..Self::default()
        }
    }

    pub fn at(start: u64) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn existing() -> Self {
        Self {
            create: false,
            ..Self::default()
        }
    }
}

/// A write session over one file.
pub struct WriteStream {
    root: DirectoryEntry,
    resolver: EntryResolver,
    path: LogicalPath,
    options: WriteOptions,
    writer: Option<Box<dyn FileWriter>>,
    opened: bool,
    position: u64,
}

impl WriteStream {
    pub(crate) fn new(
        root: DirectoryEntry,
        resolver: EntryResolver,
        path: LogicalPath,
        options: WriteOptions,
    ) -> Self {
        Self {
            root,
            resolver,
            path,
            options,
            writer: None,
            opened: false,
            position: 0,
        }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    pub fn options(&self) -> WriteOptions {
        self.options
    }

    /// Offset of the next write.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Write `data` at the current position.
    ///
    /// The position only advances once the writer reports success.
    pub async fn write(&mut self, data: impl Into<Bytes>) -> Result<()> {
        let data: Bytes = data.into();
        let len = data.len() as u64;
        self.ensure_writer().await?;
        let Some(writer) = self.writer.as_deref_mut() else {
            return Err(no_writer(&self.resolver, &self.path));
        };
        complete(&self.resolver, &self.path, writer, |w| w.write(convert::to_blob(data))).await?;
        self.position += len;
        debug!(path = %self.path, len, position = self.position, "wrote chunk");
        Ok(())
    }

    /// Resize the file to `size` bytes.
    pub async fn truncate(&mut self, size: u64) -> Result<()> {
        self.ensure_writer().await?;
        let Some(writer) = self.writer.as_deref_mut() else {
            return Err(no_writer(&self.resolver, &self.path));
        };
        complete(&self.resolver, &self.path, writer, |w| w.truncate(size)).await?;
        self.position = self.position.min(size);
        debug!(path = %self.path, size, "truncated");
        Ok(())
    }

    /// Move the writer. The position is clamped to the file length.
    pub async fn seek(&mut self, start: u64) -> Result<()> {
        self.ensure_writer().await?;
        let Some(writer) = self.writer.as_deref_mut() else {
            return Err(no_writer(&self.resolver, &self.path));
        };
        writer.seek(start);
        self.position = writer.position();
        Ok(())
    }

    /// End the session. A later write opens it again from the options.
    pub fn close(&mut self) {
        if self.opened {
            debug!(path = %self.path, position = self.position, "closed write stream");
        }
        self.opened = false;
        self.writer = None;
    }

    async fn ensure_writer(&mut self) -> Result<()> {
        if self.writer.is_none() {
            let file = self
                .resolver
                .resolve_file(&self.root, &self.path, GetOptions::create())
                .await?;
            let writer = file
                .create_writer()
                .await
                .map_err(|e| self.resolver.map(&self.path, e))?;
            self.writer = Some(writer);
        }

        if self.opened {
            let position = self.position;
            if let Some(writer) = self.writer.as_deref_mut() {
                writer.seek(position);
            }
            return Ok(());
        }

        let append_size = match (self.options.start, self.options.append) {
            (None, true) => Some(file_size(&self.root, &self.resolver, &self.path).await?),
            _ => None,
        };

        let Some(writer) = self.writer.as_deref_mut() else {
            return Err(no_writer(&self.resolver, &self.path));
        };
        match (self.options.start, append_size) {
            (Some(start), _) => {
                writer.seek(start);
                self.position = writer.position();
            }
            (None, Some(size)) => {
                writer.seek(size);
                self.position = size;
            }
            (None, None) => {
                complete(&self.resolver, &self.path, writer, |w| w.truncate(0)).await?;
                self.position = 0;
            }
        }
        self.opened = true;
        debug!(path = %self.path, position = self.position, "opened write stream");
        Ok(())
    }
}

async fn file_size(
    root: &DirectoryEntry,
    resolver: &EntryResolver,
    path: &LogicalPath,
) -> Result<u64> {
    let file = resolver
        .resolve_file(root, path, GetOptions::existing())
        .await?;
    let metadata = file.metadata().await.map_err(|e| resolver.map(path, e))?;
    Ok(metadata.size)
}

fn no_writer(resolver: &EntryResolver, path: &LogicalPath) -> Error {
    Error::new(
        ErrorKind::Other,
        resolver.repository().as_str(),
        path.as_str(),
        "writer is not available",
    )
}

/// Run one writer mutation and wait for its outcome.
async fn complete<F>(
    resolver: &EntryResolver,
    path: &LogicalPath,
    writer: &mut dyn FileWriter,
    mutate: F,
) -> Result<()>
where
    F: FnOnce(&mut dyn FileWriter),
{
    let (tx, rx) = oneshot::channel();
    writer.set_listener(Some(Box::new(move |outcome| {
        let _ = tx.send(outcome);
    })));
    mutate(&mut *writer);
    let outcome = rx.await;
    writer.set_listener(None);

    let repository = resolver.repository().as_str();
    match outcome {
        Ok(WriteOutcome::Success) => Ok(()),
        Ok(WriteOutcome::Abort(e)) => {
            warn!(%path, error = %e, "write aborted");
            Err(Error::new(ErrorKind::Abort, repository, path.as_str(), e))
        }
        Ok(WriteOutcome::Error(e)) => {
            warn!(%path, error = %e, "write failed");
            Err(Error::new(
                ErrorKind::NoModificationAllowed,
                repository,
                path.as_str(),
                e,
            ))
        }
        Err(_) => Err(Error::new(
            ErrorKind::Other,
            repository,
            path.as_str(),
            "writer dropped the completion listener",
        )),
    }
}

impl std::fmt::Debug for WriteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteStream")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("opened", &self.opened)
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use wfs_storage::memory::{MemoryStorage, WriteFault};

    struct Fixture {
        storage: MemoryStorage,
        root: DirectoryEntry,
    }

    impl Fixture {
        fn new() -> Self {
            let storage = MemoryStorage::new();
            let root = DirectoryEntry::root(Arc::new(storage.clone()));
            Self { storage, root }
        }

        fn open(&self, options: WriteOptions) -> WriteStream {
            WriteStream::new(
                self.root.clone(),
                EntryResolver::new(LogicalPath::root()),
                "/f".into(),
                options,
            )
        }

        async fn content(&self) -> Bytes {
            let file = self.root.get_file("/f", GetOptions::existing()).await.unwrap();
            file.file().await.unwrap().into_bytes()
        }
    }

    #[tokio::test]
    async fn first_write_truncates() {
        let fx = Fixture::new();
        let mut first = fx.open(WriteOptions::default());
        first.write("hello world").await.unwrap();
        first.close();

        let mut second = fx.open(WriteOptions::default());
        second.write("bye").await.unwrap();

        assert_eq!(fx.content().await, &b"bye"[..]);
        assert_eq!(second.position(), 3);
    }

    #[tokio::test]
    async fn writes_are_sequential() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("ab").await.unwrap();
        stream.write("cd").await.unwrap();
        assert!(stream.is_opened());
        assert_eq!(fx.content().await, &b"abcd"[..]);
    }

    #[tokio::test]
    async fn append_starts_at_end() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("hello").await.unwrap();
        stream.close();

        let mut stream = fx.open(WriteOptions::append());
        stream.write(" world").await.unwrap();

        assert_eq!(fx.content().await, &b"hello world"[..]);
        assert_eq!(stream.position(), 11);
    }

    #[tokio::test]
    async fn explicit_start_overwrites_in_place() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abcdef").await.unwrap();
        stream.close();

        let mut stream = fx.open(WriteOptions::at(2));
        stream.write("XY").await.unwrap();

        assert_eq!(fx.content().await, &b"abXYef"[..]);
    }

    #[tokio::test]
    async fn seek_is_clamped_to_length() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abc").await.unwrap();
        stream.seek(1).await.unwrap();
        assert_eq!(stream.position(), 1);
        stream.seek(100).await.unwrap();
        assert_eq!(stream.position(), 3);
    }

    #[tokio::test]
    async fn truncate_then_write() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abcdef").await.unwrap();
        stream.truncate(0).await.unwrap();
        assert_eq!(stream.position(), 0);
        stream.write("xyz").await.unwrap();
        assert_eq!(fx.content().await, &b"xyz"[..]);
    }

    #[tokio::test]
    async fn truncate_keeps_earlier_position() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abcdef").await.unwrap();
        stream.seek(2).await.unwrap();
        stream.truncate(4).await.unwrap();
        assert_eq!(stream.position(), 2);
        assert_eq!(fx.content().await, &b"abcd"[..]);
    }

    #[tokio::test]
    async fn abort_surfaces_and_keeps_position() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abc").await.unwrap();

        fx.storage.fail_next_write(WriteFault::Abort);
        let err = stream.write("def").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Abort);
        assert_eq!(stream.position(), 3);

        stream.write("ghi").await.unwrap();
        assert_eq!(fx.content().await, &b"abcghi"[..]);
    }

    #[tokio::test]
    async fn writer_error_is_no_modification_allowed() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abc").await.unwrap();

        fx.storage.fail_next_write(WriteFault::Error);
        let err = stream.truncate(1).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoModificationAllowed);
        assert_eq!(fx.content().await, &b"abc"[..]);
    }

    #[tokio::test]
    async fn growing_past_capacity_is_rejected() {
        let fx = Fixture::new();
        fx.storage.set_capacity(16);
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abc").await.unwrap();

        let err = stream.truncate(u64::MAX).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoModificationAllowed);
        assert_eq!(stream.position(), 3);

        let err = stream.write(vec![0u8; 14]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoModificationAllowed);
        assert_eq!(stream.position(), 3);

        stream.write("def").await.unwrap();
        assert_eq!(fx.content().await, &b"abcdef"[..]);
    }

    #[tokio::test]
    async fn failed_opening_truncate_is_retried() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abc").await.unwrap();
        stream.close();

        let mut stream = fx.open(WriteOptions::default());
        fx.storage.fail_next_write(WriteFault::Abort);
        let err = stream.write("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Abort);
        assert!(!stream.is_opened());

        stream.write("x").await.unwrap();
        assert_eq!(fx.content().await, &b"x"[..]);
    }

    #[tokio::test]
    async fn write_after_close_reopens() {
        let fx = Fixture::new();
        let mut stream = fx.open(WriteOptions::default());
        stream.write("abc").await.unwrap();
        stream.close();
        assert!(!stream.is_opened());

        stream.write("d").await.unwrap();
        assert_eq!(fx.content().await, &b"d"[..]);
    }
}
