//! Pull-based chunked reads over a file entry

use crate::error::{Error, ErrorKind, Result};
use crate::path::LogicalPath;
use crate::resolver::EntryResolver;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use tracing::debug;
use wfs_storage::{DirectoryEntry, GetOptions};

/// Options for opening a [`ReadStream`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Initial position.
    pub start: Option<u64>,
    /// Chunk size overriding the configured one.
    pub buffer_size: Option<usize>,
}

impl ReadOptions {
    pub fn from_start(start: u64) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }
}

/// A read cursor over one file.
///
/// Each read probes the file again and slices the requested range from a
/// fresh snapshot, so content written in between is observed. Nothing is
/// buffered beyond the chunk being returned.
pub struct ReadStream {
    root: DirectoryEntry,
    resolver: EntryResolver,
    path: LogicalPath,
    position: u64,
    buffer_size: usize,
    closed: bool,
}

impl ReadStream {
    pub(crate) fn new(
        root: DirectoryEntry,
        resolver: EntryResolver,
        path: LogicalPath,
        options: ReadOptions,
        default_buffer_size: usize,
    ) -> Self {
        Self {
            root,
            resolver,
            path,
            position: options.start.unwrap_or(0),
            buffer_size: options.buffer_size.unwrap_or(default_buffer_size).max(1),
            closed: false,
        }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Read the next chunk of at most `size_hint` bytes, or of the buffer
    /// size when no hint is given.
    ///
    /// Returns `None` at end of file and after [`close`](Self::close).
    pub async fn read(&mut self, size_hint: Option<usize>) -> Result<Option<Bytes>> {
        if self.closed {
            return Ok(None);
        }

        let file = self
            .resolver
            .resolve_file(&self.root, &self.path, GetOptions::existing())
            .await?;
        let blob = file.file().await.map_err(|e| self.resolver.map(&self.path, e))?;

        let file_size = blob.size();
        if self.position >= file_size {
            debug!(path = %self.path, position = self.position, "end of stream");
            return Ok(None);
        }

        let chunk = size_hint.unwrap_or(self.buffer_size).max(1) as u64;
        let end = self.position.saturating_add(chunk).min(file_size);
        let data = blob.slice(self.position, end).into_bytes();
        self.position += data.len() as u64;
        Ok(Some(data))
    }

    /// Move the cursor. No I/O happens until the next read.
    pub fn seek(&mut self, start: u64) -> Result<()> {
        if self.closed {
            return Err(Error::new(
                ErrorKind::Other,
                self.resolver.repository().as_str(),
                self.path.as_str(),
                "read stream is closed",
            ));
        }
        self.position = start;
        Ok(())
    }

    /// Read everything from the current position to the end.
    pub async fn read_all(&mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.read(None).await? {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// Release the cursor. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            debug!(path = %self.path, position = self.position, "closed read stream");
        }
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Chunks from the current position to the end as a stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send {
        futures::stream::try_unfold(self, |mut stream| async move {
            Ok::<_, Error>(stream.read(None).await?.map(|chunk| (chunk, stream)))
        })
    }
}

impl std::fmt::Debug for ReadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadStream")
            .field("path", &self.path)
            .field("position", &self.position)
            .field("buffer_size", &self.buffer_size)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use wfs_storage::memory::MemoryStorage;

    async fn stream_over(content: &'static [u8], options: ReadOptions) -> ReadStream {
        let root = DirectoryEntry::root(Arc::new(MemoryStorage::new()));
        let file = root.get_file("/f.bin", GetOptions::create()).await.unwrap();
        let mut writer = file.create_writer().await.unwrap();
        writer.write(content.into());
        ReadStream::new(
            root,
            EntryResolver::new(LogicalPath::root()),
            "/f.bin".into(),
            options,
            4,
        )
    }

    #[tokio::test]
    async fn reads_in_buffer_sized_chunks() {
        let mut stream = stream_over(b"0123456789", ReadOptions::default()).await;

        assert_eq!(stream.read(None).await.unwrap().unwrap(), &b"0123"[..]);
        assert_eq!(stream.read(None).await.unwrap().unwrap(), &b"4567"[..]);
        assert_eq!(stream.read(None).await.unwrap().unwrap(), &b"89"[..]);
        assert_eq!(stream.read(None).await.unwrap(), None);
        assert_eq!(stream.position(), 10);
    }

    #[tokio::test]
    async fn size_hint_overrides_buffer() {
        let mut stream = stream_over(b"0123456789", ReadOptions::default()).await;
        assert_eq!(stream.read(Some(7)).await.unwrap().unwrap(), &b"0123456"[..]);
        assert_eq!(stream.read(Some(0)).await.unwrap().unwrap(), &b"7"[..]);
    }

    #[tokio::test]
    async fn seek_moves_cursor() {
        let mut stream = stream_over(b"0123456789", ReadOptions::default()).await;
        stream.seek(8).unwrap();
        assert_eq!(stream.read_all().await.unwrap(), &b"89"[..]);

        stream.seek(10).unwrap();
        assert_eq!(stream.read(None).await.unwrap(), None);
        stream.seek(99).unwrap();
        assert_eq!(stream.read(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn start_option_sets_initial_position() {
        let mut stream = stream_over(b"abcdef", ReadOptions::from_start(2)).await;
        assert_eq!(stream.read_all().await.unwrap(), &b"cdef"[..]);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut stream = stream_over(b"abc", ReadOptions::default()).await;
        stream.close();
        stream.close();
        assert!(stream.is_closed());
        assert_eq!(stream.read(None).await.unwrap(), None);
        assert!(stream.seek(0).is_err());
    }

    #[tokio::test]
    async fn empty_file_ends_immediately() {
        let mut stream = stream_over(b"", ReadOptions::default()).await;
        assert_eq!(stream.read(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let root = DirectoryEntry::root(Arc::new(MemoryStorage::new()));
        let mut stream = ReadStream::new(
            root,
            EntryResolver::new(LogicalPath::root()),
            "/missing".into(),
            ReadOptions::default(),
            4,
        );
        let err = stream.read(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn into_stream_yields_chunks() {
        let stream = stream_over(b"0123456789", ReadOptions::default()).await;
        let chunks: Vec<Bytes> = stream.into_stream().try_collect().await.unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), b"0123456789".to_vec());
    }
}
