use crate::storage::{
    CompletionListener, EntryKind, FileWriter, GetOptions, Metadata, Storage, WriteOutcome,
};
use crate::{Blob, StorageError, StorageErrorCode, StorageResult, paths};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// Storage area mapped onto a directory of the host filesystem.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root_dir: PathBuf,
}

impl DiskStorage {
    /// Map the storage root onto `root_dir`, which must already exist.
    pub fn new(root_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            root_dir: std::path::absolute(root_dir)?,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Host path of a storage path.
    fn host_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root_dir.clone(), |acc, segment| acc.join(segment))
    }

    async fn kind_of(&self, path: &str) -> StorageResult<Option<EntryKind>> {
        match tokio::fs::metadata(self.host_path(path)).await {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, &e)),
        }
    }

    async fn require(&self, path: &str, kind: EntryKind) -> StorageResult<()> {
        match self.kind_of(path).await? {
            Some(found) if found == kind => Ok(()),
            Some(_) => Err(StorageError::type_mismatch(path, &kind.to_string())),
            None => Err(StorageError::not_found(path)),
        }
    }

    async fn get_or_create(
        &self,
        path: &str,
        kind: EntryKind,
        options: GetOptions,
    ) -> StorageResult<()> {
        match self.kind_of(path).await? {
            Some(found) if found != kind => {
                return Err(StorageError::type_mismatch(path, &kind.to_string()));
            }
            Some(_) if options.create && options.exclusive => {
                return Err(StorageError::new(
                    StorageErrorCode::PathExists,
                    format!("{path} already exists"),
                ));
            }
            Some(_) => return Ok(()),
            None if !options.create => return Err(StorageError::not_found(path)),
            None => {}
        }

        let parent = paths::parent(path).ok_or_else(|| StorageError::not_found(path))?;
        self.require(parent, EntryKind::Directory).await?;

        let host_path = self.host_path(path);
        let created = match kind {
            EntryKind::File => tokio::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&host_path)
                .await
                .map(|_| ()),
            EntryKind::Directory => tokio::fs::create_dir(&host_path).await,
        };
        created.map_err(|e| StorageError::io(path, &e))
    }
}

#[async_trait]
impl Storage for DiskStorage {
    async fn get_file(&self, path: &str, options: GetOptions) -> StorageResult<()> {
        self.get_or_create(path, EntryKind::File, options).await
    }

    async fn get_directory(&self, path: &str, options: GetOptions) -> StorageResult<()> {
        self.get_or_create(path, EntryKind::Directory, options).await
    }

    async fn metadata(&self, path: &str) -> StorageResult<Metadata> {
        let meta = tokio::fs::metadata(self.host_path(path))
            .await
            .map_err(|e| StorageError::io(path, &e))?;
        let modification_time = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .map_err(|e| StorageError::io(path, &e))?;
        Ok(Metadata {
            modification_time,
            size: if meta.is_dir() { 0 } else { meta.len() },
        })
    }

    async fn read_entries(&self, path: &str) -> StorageResult<Vec<(String, EntryKind)>> {
        self.require(path, EntryKind::Directory).await?;

        let mut dir = tokio::fs::read_dir(self.host_path(path))
            .await
            .map_err(|e| StorageError::io(path, &e))?;
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| StorageError::io(path, &e))? {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::io(path, &e))?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push((paths::resolve(path, &name), kind));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    async fn remove(&self, path: &str) -> StorageResult<()> {
        if path == "/" {
            return Err(StorageError::invalid_modification("cannot remove the root"));
        }
        let host_path = self.host_path(path);
        let removed = match self.kind_of(path).await? {
            Some(EntryKind::Directory) => tokio::fs::remove_dir(&host_path).await,
            Some(EntryKind::File) => tokio::fs::remove_file(&host_path).await,
            None => return Err(StorageError::not_found(path)),
        };
        removed.map_err(|e| StorageError::io(path, &e))
    }

    async fn remove_recursively(&self, path: &str) -> StorageResult<()> {
        if path == "/" {
            return Err(StorageError::invalid_modification("cannot remove the root"));
        }
        self.require(path, EntryKind::Directory).await?;
        tokio::fs::remove_dir_all(self.host_path(path))
            .await
            .map_err(|e| StorageError::io(path, &e))
    }

    async fn file(&self, path: &str) -> StorageResult<Blob> {
        self.require(path, EntryKind::File).await?;
        let content = tokio::fs::read(self.host_path(path))
            .await
            .map_err(|e| StorageError::io(path, &e))?;
        Ok(Blob::from(content))
    }

    async fn create_writer(&self, path: &str) -> StorageResult<Box<dyn FileWriter>> {
        self.require(path, EntryKind::File).await?;
        let length = self.metadata(path).await?.size;
        Ok(Box::new(DiskWriter {
            path: path.to_string(),
            host_path: self.host_path(path),
            shared: Arc::new(Mutex::new(WriterState {
                position: 0,
                length,
                busy: false,
                listener: None,
            })),
        }))
    }

    fn url(&self, path: &str) -> Option<String> {
        url::Url::from_file_path(self.host_path(path))
            .ok()
            .map(String::from)
    }
}

struct WriterState {
    position: u64,
    length: u64,
    busy: bool,
    listener: Option<CompletionListener>,
}

enum Mutation {
    Write(Blob),
    Truncate(u64),
}

/// Writer over a [`DiskStorage`] file.
///
/// Each mutation runs on a spawned task and reports through the listener
/// once the host filesystem call has finished. A mutation started while
/// another is in flight fails immediately.
pub struct DiskWriter {
    path: String,
    host_path: PathBuf,
    shared: Arc<Mutex<WriterState>>,
}

impl DiskWriter {
    fn lock(&self) -> MutexGuard<'_, WriterState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fail_now(&self, error: StorageError) {
        let listener = self.lock().listener.take();
        if let Some(listener) = listener {
            listener(WriteOutcome::Error(error));
        }
    }

    fn start(&mut self, mutation: Mutation) {
        let position = {
            let mut state = self.lock();
            if state.busy {
                drop(state);
                self.fail_now(StorageError::new(
                    StorageErrorCode::InvalidState,
                    format!("a mutation of {} is already in progress", self.path),
                ));
                return;
            }
            state.busy = true;
            state.position
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                self.lock().busy = false;
                self.fail_now(StorageError::new(StorageErrorCode::InvalidState, e.to_string()));
                return;
            }
        };

        let path = self.path.clone();
        let host_path = self.host_path.clone();
        let shared = Arc::clone(&self.shared);
        runtime.spawn(async move {
            let result = match &mutation {
                Mutation::Write(data) => write_at(&host_path, position, data).await,
                Mutation::Truncate(size) => truncate_to(&host_path, *size).await,
            };

            let (listener, outcome) = {
                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                state.busy = false;
                let outcome = match result {
                    Ok(length) => {
                        state.length = length;
                        state.position = match &mutation {
                            Mutation::Write(data) => position + data.size(),
                            Mutation::Truncate(size) => state.position.min(*size),
                        };
                        WriteOutcome::Success
                    }
                    Err(e) => WriteOutcome::Error(StorageError::io(&path, &e)),
                };
                (state.listener.take(), outcome)
            };
            if let Some(listener) = listener {
                listener(outcome);
            }
        });
    }
}

async fn write_at(host_path: &Path, offset: u64, data: &Blob) -> std::io::Result<u64> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .open(host_path)
        .await?;
    file.seek(SeekFrom::Start(offset)).await?;
    file.write_all(data.bytes()).await?;
    file.flush().await?;
    Ok(file.metadata().await?.len())
}

async fn truncate_to(host_path: &Path, size: u64) -> std::io::Result<u64> {
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .open(host_path)
        .await?;
    file.set_len(size).await?;
    Ok(size)
}

impl FileWriter for DiskWriter {
    fn position(&self) -> u64 {
        self.lock().position
    }

    fn length(&self) -> u64 {
        self.lock().length
    }

    fn seek(&mut self, offset: u64) {
        let mut state = self.lock();
        state.position = offset.min(state.length);
    }

    fn set_listener(&mut self, listener: Option<CompletionListener>) {
        self.lock().listener = listener;
    }

    fn write(&mut self, data: Blob) {
        self.start(Mutation::Write(data));
    }

    fn truncate(&mut self, size: u64) {
        self.start(Mutation::Truncate(size));
    }
}
