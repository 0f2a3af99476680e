//! The memory and disk backends must be indistinguishable through the
//! facade: same listings, same contents, same error kinds.

use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use rstest::rstest;
use wfs_fs::{
    EntryKind, ErrorKind, FileSystem, MakeDirectoryOptions, ReadOptions, UrlOptions, UrlType,
    WriteOptions,
};
use wfs_test_utils::{MemoryFixture, TestSandbox};

/// Observable outcome of one operation.
#[derive(Debug, PartialEq)]
enum Outcome {
    Ok,
    Failed(ErrorKind),
}

impl<T> From<wfs_fs::Result<T>> for Outcome {
    fn from(result: wfs_fs::Result<T>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(e) => Outcome::Failed(e.kind()),
        }
    }
}

async fn seed(fs: &FileSystem) {
    fs.make_directory("/src/bin", MakeDirectoryOptions::parents())
        .await
        .unwrap();
    fs.write_file("/src/lib.rs", "pub fn lib() {}\n").await.unwrap();
    fs.write_file("/src/bin/main.rs", "fn main() {}\n").await.unwrap();
    fs.write_file("/README.md", "# parity\n").await.unwrap();
}

async fn snapshot(fs: &FileSystem) -> Vec<(String, EntryKind, Option<u64>)> {
    let mut pending = vec!["/".to_string()];
    let mut out = Vec::new();
    while let Some(dir) = pending.pop() {
        for item in fs.list_directory(dir.as_str()).await.unwrap() {
            let size = fs.stat_entry(&item.path).await.unwrap().size;
            if item.is_directory() {
                pending.push(item.path.as_str().to_string());
            }
            out.push((item.path.as_str().to_string(), item.kind, size));
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

async fn probe_errors(fs: &FileSystem) -> Vec<Outcome> {
    vec![
        fs.resolve("/missing").await.into(),
        fs.remove_directory("/src").await.into(),
        fs.make_directory("/x/y", MakeDirectoryOptions::default()).await.into(),
        fs.make_directory("/src/lib.rs", MakeDirectoryOptions::default()).await.into(),
        fs.open_write_stream("/nope.txt", WriteOptions::existing()).await.into(),
        fs.list_directory("/README.md").await.into(),
        fs.to_url("/README.md", false, UrlOptions { url_type: UrlType::Put }).await.into(),
        fs.patch_metadata("/README.md", &Default::default()).await.into(),
    ]
}

#[tokio::test]
async fn trees_match_across_backends() {
    let memory = MemoryFixture::new("/parity");
    let sandbox = TestSandbox::new();
    let disk = sandbox.fs("/parity");

    seed(&memory.fs).await;
    seed(&disk).await;

    let from_memory = snapshot(&memory.fs).await;
    assert_eq!(from_memory, snapshot(&disk).await);
    assert_eq!(from_memory.len(), 5);
}

#[tokio::test]
async fn error_kinds_match_across_backends() {
    let memory = MemoryFixture::new("/parity");
    let sandbox = TestSandbox::new();
    let disk = sandbox.fs("/parity");

    seed(&memory.fs).await;
    seed(&disk).await;

    let expected = probe_errors(&memory.fs).await;
    assert_eq!(expected, probe_errors(&disk).await);
    assert_eq!(expected[0], Outcome::Failed(ErrorKind::NotFound));
    assert_eq!(expected[6], Outcome::Failed(ErrorKind::NotSupported));
    assert_eq!(expected[7], Outcome::Failed(ErrorKind::NotSupported));
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(64)]
#[tokio::test]
async fn chunk_streams_agree(#[case] buffer_size: usize) {
    let memory = MemoryFixture::new("/parity");
    let sandbox = TestSandbox::new();
    let disk = sandbox.fs("/parity");
    let content = "0123456789abcdefghij";

    let mut chunks = Vec::new();
    for fs in [&memory.fs, &disk] {
        fs.write_file("/data.txt", content).await.unwrap();
        let reader = fs
            .open_read_stream(
                "/data.txt",
                ReadOptions {
                    start: Some(2),
                    buffer_size: Some(buffer_size),
                },
            )
            .await
            .unwrap();
        let collected: Vec<_> = reader.into_stream().try_collect().await.unwrap();
        chunks.push(collected);
    }

    assert_eq!(chunks[0], chunks[1]);
    let joined: Vec<u8> = chunks[0].iter().flat_map(|c| c.to_vec()).collect();
    assert_eq!(joined, content.as_bytes()[2..].to_vec());
}
