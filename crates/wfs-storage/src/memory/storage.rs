use crate::storage::{
    CompletionListener, EntryKind, FileWriter, GetOptions, Metadata, Storage, WriteOutcome,
};
use crate::{Blob, StorageError, StorageErrorCode, StorageResult, paths};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fault injected into the next writer mutation of a [`MemoryStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// The mutation is aborted before completion.
    Abort,
    /// The mutation fails with a write-time error.
    Error,
}

#[derive(Debug, Clone)]
enum NodeData {
    File(Vec<u8>),
    Directory,
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    modified: DateTime<Utc>,
}

impl Node {
    fn file() -> Self {
        Self {
            data: NodeData::File(Vec::new()),
            modified: Utc::now(),
        }
    }

    fn directory() -> Self {
        Self {
            data: NodeData::Directory,
            modified: Utc::now(),
        }
    }

    fn kind(&self) -> EntryKind {
        match self.data {
            NodeData::File(_) => EntryKind::File,
            NodeData::Directory => EntryKind::Directory,
        }
    }
}

/// Capacity of a storage area until a host grants it a quota.
pub const DEFAULT_CAPACITY_BYTES: u64 = 1 << 30;

#[derive(Debug)]
struct State {
    nodes: BTreeMap<String, Node>,
    write_faults: VecDeque<WriteFault>,
    capacity: u64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::from([("/".to_string(), Node::directory())]),
            write_faults: VecDeque::new(),
            capacity: DEFAULT_CAPACITY_BYTES,
        }
    }
}

impl State {
    fn require(&self, path: &str) -> StorageResult<&Node> {
        self.nodes.get(path).ok_or_else(|| StorageError::not_found(path))
    }

    fn require_file(&self, path: &str) -> StorageResult<&Vec<u8>> {
        match &self.require(path)?.data {
            NodeData::File(content) => Ok(content),
            NodeData::Directory => Err(StorageError::type_mismatch(path, "file")),
        }
    }

    fn require_directory(&self, path: &str) -> StorageResult<()> {
        match self.require(path)?.data {
            NodeData::Directory => Ok(()),
            NodeData::File(_) => Err(StorageError::type_mismatch(path, "directory")),
        }
    }

    /// Bytes held by all files.
    fn usage(&self) -> u64 {
        self.nodes
            .values()
            .map(|node| match &node.data {
                NodeData::File(content) => content.len() as u64,
                NodeData::Directory => 0,
            })
            .sum()
    }

    fn children(&self, path: &str) -> Vec<(String, EntryKind)> {
        self.nodes
            .iter()
            .filter(|(key, _)| key.as_str() != "/" && paths::parent(key) == Some(path))
            .map(|(key, node)| (key.clone(), node.kind()))
            .collect()
    }

    fn get_or_create(&mut self, path: &str, kind: EntryKind, options: GetOptions) -> StorageResult<()> {
        if let Some(node) = self.nodes.get(path) {
            if node.kind() != kind {
                return Err(StorageError::type_mismatch(path, &kind.to_string()));
            }
            if options.create && options.exclusive {
                return Err(StorageError::new(
                    StorageErrorCode::PathExists,
                    format!("{path} already exists"),
                ));
            }
            return Ok(());
        }

        if !options.create {
            return Err(StorageError::not_found(path));
        }

        let parent = paths::parent(path).ok_or_else(|| StorageError::not_found(path))?;
        self.require_directory(parent)?;

        let node = match kind {
            EntryKind::File => Node::file(),
            EntryKind::Directory => Node::directory(),
        };
        self.nodes.insert(path.to_string(), node);
        Ok(())
    }
}

/// In-process storage area.
///
/// Clones share the same tree. Writers complete their mutations before
/// returning from `write`/`truncate`, so the outcome is already waiting when
/// the caller awaits it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<State>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next writer mutation (write or truncate) fail with `fault`.
    ///
    /// Faults queue up and are consumed one per mutation.
    pub fn fail_next_write(&self, fault: WriteFault) {
        self.lock().write_faults.push_back(fault);
    }

    /// Limit the bytes all files may hold together.
    ///
    /// Mutations that would grow past it fail with `QuotaExceeded`.
    pub fn set_capacity(&self, bytes: u64) {
        self.lock().capacity = bytes;
    }

    pub fn capacity(&self) -> u64 {
        self.lock().capacity
    }

    /// Number of entries in the tree, root included.
    pub fn entry_count(&self) -> usize {
        self.lock().nodes.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_file(&self, path: &str, options: GetOptions) -> StorageResult<()> {
        self.lock().get_or_create(path, EntryKind::File, options)
    }

    async fn get_directory(&self, path: &str, options: GetOptions) -> StorageResult<()> {
        self.lock().get_or_create(path, EntryKind::Directory, options)
    }

    async fn metadata(&self, path: &str) -> StorageResult<Metadata> {
        let state = self.lock();
        let node = state.require(path)?;
        let size = match &node.data {
            NodeData::File(content) => content.len() as u64,
            NodeData::Directory => 0,
        };
        Ok(Metadata {
            modification_time: node.modified,
            size,
        })
    }

    async fn read_entries(&self, path: &str) -> StorageResult<Vec<(String, EntryKind)>> {
        let state = self.lock();
        state.require_directory(path)?;
        Ok(state.children(path))
    }

    async fn remove(&self, path: &str) -> StorageResult<()> {
        let mut state = self.lock();
        if path == "/" {
            return Err(StorageError::invalid_modification("cannot remove the root"));
        }
        let node = state.require(path)?;
        if node.kind() == EntryKind::Directory && !state.children(path).is_empty() {
            return Err(StorageError::invalid_modification(format!(
                "{path} is not empty"
            )));
        }
        state.nodes.remove(path);
        Ok(())
    }

    async fn remove_recursively(&self, path: &str) -> StorageResult<()> {
        let mut state = self.lock();
        if path == "/" {
            return Err(StorageError::invalid_modification("cannot remove the root"));
        }
        state.require_directory(path)?;
        let prefix = format!("{path}/");
        state
            .nodes
            .retain(|key, _| key != path && !key.starts_with(&prefix));
        Ok(())
    }

    async fn file(&self, path: &str) -> StorageResult<Blob> {
        let state = self.lock();
        Ok(Blob::from(state.require_file(path)?.clone()))
    }

    async fn create_writer(&self, path: &str) -> StorageResult<Box<dyn FileWriter>> {
        self.lock().require_file(path)?;
        Ok(Box::new(MemoryWriter {
            storage: self.clone(),
            path: path.to_string(),
            position: 0,
            listener: None,
        }))
    }

    fn url(&self, _path: &str) -> Option<String> {
        None
    }
}

/// Writer over a [`MemoryStorage`] file.
pub struct MemoryWriter {
    storage: MemoryStorage,
    path: String,
    position: u64,
    listener: Option<CompletionListener>,
}

enum Mutation {
    Write(Blob),
    Truncate(u64),
}

impl Mutation {
    /// File length once applied to `len` bytes with the cursor at `position`.
    fn resulting_len(&self, len: u64, position: u64) -> u64 {
        match self {
            Mutation::Write(data) => len.max(position.min(len).saturating_add(data.size())),
            Mutation::Truncate(size) => *size,
        }
    }

    fn apply(&self, content: &mut Vec<u8>, position: &mut u64) {
        match self {
            Mutation::Write(data) => {
                let start = usize::try_from(*position).unwrap_or(content.len()).min(content.len());
                let bytes = data.bytes();
                let end = start + bytes.len();
                if content.len() < end {
                    content.resize(end, 0);
                }
                content[start..end].copy_from_slice(bytes);
                *position = end as u64;
            }
            Mutation::Truncate(size) => {
                // Bounded by the capacity check in `MemoryWriter::run`.
                let size = usize::try_from(*size).unwrap_or(content.len());
                content.resize(size, 0);
                *position = (*position).min(size as u64);
            }
        }
    }
}

impl MemoryWriter {
    fn complete(&mut self, outcome: WriteOutcome) {
        if let Some(listener) = self.listener.take() {
            listener(outcome);
        }
    }

    /// Apply `mutation` to the file content, honouring queued faults and
    /// the storage capacity.
    fn run(&mut self, mutation: Mutation) {
        let outcome = {
            let mut state = self.storage.lock();
            let usage = state.usage();
            let capacity = state.capacity;
            match state.write_faults.pop_front() {
                Some(WriteFault::Abort) => WriteOutcome::Abort(StorageError::new(
                    StorageErrorCode::Abort,
                    format!("write to {} was aborted", self.path),
                )),
                Some(WriteFault::Error) => WriteOutcome::Error(StorageError::new(
                    StorageErrorCode::InvalidState,
                    format!("write to {} failed", self.path),
                )),
                None => match state.nodes.get_mut(&self.path) {
                    Some(Node {
                        data: NodeData::File(content),
                        modified,
                    }) => {
                        let len = content.len() as u64;
                        let new_len = mutation.resulting_len(len, self.position);
                        let needed = (usage - len).saturating_add(new_len);
                        if needed > capacity {
                            WriteOutcome::Error(StorageError::quota_exceeded(format!(
                                "{} would need {needed} bytes of {capacity} available",
                                self.path
                            )))
                        } else {
                            mutation.apply(content, &mut self.position);
                            *modified = Utc::now();
                            WriteOutcome::Success
                        }
                    }
                    Some(_) => WriteOutcome::Error(StorageError::type_mismatch(&self.path, "file")),
                    None => WriteOutcome::Error(StorageError::not_found(&self.path)),
                },
            }
        };
        self.complete(outcome);
    }
}

impl FileWriter for MemoryWriter {
    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> u64 {
        self.storage
            .lock()
            .require_file(&self.path)
            .map(|content| content.len() as u64)
            .unwrap_or(0)
    }

    fn seek(&mut self, offset: u64) {
        self.position = offset.min(self.length());
    }

    fn set_listener(&mut self, listener: Option<CompletionListener>) {
        self.listener = listener;
    }

    fn write(&mut self, data: Blob) {
        self.run(Mutation::Write(data));
    }

    fn truncate(&mut self, size: u64) {
        self.run(Mutation::Truncate(size));
    }
}
