//! End-to-end lifecycle of a file inside a repository, run against both the
//! in-memory and the disk backend.
//!
//! Flow: create -> read back -> append -> overwrite -> remove -> stat fails.

use pretty_assertions::assert_eq;
use rstest::rstest;
use wfs_fs::{ErrorKind, FileSystem, MakeDirectoryOptions, ReadOptions, WriteOptions};
use wfs_test_utils::{MemoryFixture, TestSandbox};

#[derive(Debug, Clone, Copy)]
enum Backend {
    Memory,
    Disk,
}

/// A facade plus whatever keeps its backing storage alive.
struct Setup {
    fs: FileSystem,
    _sandbox: Option<TestSandbox>,
}

fn setup(backend: Backend, repository: &str) -> Setup {
    match backend {
        Backend::Memory => Setup {
            fs: MemoryFixture::new(repository).fs,
            _sandbox: None,
        },
        Backend::Disk => {
            let sandbox = TestSandbox::new();
            Setup {
                fs: sandbox.fs(repository),
                _sandbox: Some(sandbox),
            }
        }
    }
}

async fn read_string(fs: &FileSystem, path: &str) -> String {
    let mut reader = fs.open_read_stream(path, ReadOptions::default()).await.unwrap();
    String::from_utf8(reader.read_all().await.unwrap().to_vec()).unwrap()
}

async fn size_of(fs: &FileSystem, path: &str) -> Option<u64> {
    fs.stat_entry(path).await.unwrap().size
}

#[rstest]
#[tokio::test]
async fn file_lifecycle(#[values(Backend::Memory, Backend::Disk)] backend: Backend) {
    let Setup { fs, _sandbox } = setup(backend, "/sandbox");

    fs.make_directory("/a", MakeDirectoryOptions::default())
        .await
        .unwrap();

    // Create
    let mut writer = fs
        .open_write_stream("/a/b.txt", WriteOptions::default())
        .await
        .unwrap();
    writer.write("hello").await.unwrap();
    writer.close();
    assert_eq!(read_string(&fs, "/a/b.txt").await, "hello");
    assert_eq!(size_of(&fs, "/a/b.txt").await, Some(5));

    // Append
    let mut writer = fs
        .open_write_stream("/a/b.txt", WriteOptions::append())
        .await
        .unwrap();
    writer.write(" world").await.unwrap();
    writer.close();
    assert_eq!(read_string(&fs, "/a/b.txt").await, "hello world");
    assert_eq!(size_of(&fs, "/a/b.txt").await, Some(11));

    // Fresh overwrite
    let mut writer = fs
        .open_write_stream("/a/b.txt", WriteOptions::default())
        .await
        .unwrap();
    writer.write("x").await.unwrap();
    writer.close();
    assert_eq!(read_string(&fs, "/a/b.txt").await, "x");
    assert_eq!(size_of(&fs, "/a/b.txt").await, Some(1));

    // Remove
    fs.remove_file("/a/b.txt").await.unwrap();
    let err = fs.stat_entry("/a/b.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.path(), "/a/b.txt");
    assert_eq!(err.repository(), "/sandbox");
}

#[rstest]
#[tokio::test]
async fn lifecycle_through_handles(#[values(Backend::Memory, Backend::Disk)] backend: Backend) {
    let Setup { fs, _sandbox } = setup(backend, "/sandbox/project");

    let docs = fs.directory("/docs");
    docs.make(MakeDirectoryOptions::default()).await.unwrap();

    let readme = docs.file("readme.md");
    readme.write("# Title\n").await.unwrap();
    readme.append("body\n").await.unwrap();
    assert_eq!(readme.read_to_string().await.unwrap(), "# Title\nbody\n");

    let listing = docs.list().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].path.as_str(), "/docs/readme.md");
    assert!(listing[0].is_file());

    assert!(docs.remove().await.is_err());
    docs.remove_all().await.unwrap();
    assert_eq!(fs.kind_of("/docs").await.unwrap(), None);
}

#[tokio::test]
async fn disk_layout_matches_repository() {
    let sandbox = TestSandbox::new();
    let fs = sandbox.fs("/sandbox");

    fs.make_directory("/nested/deeper", MakeDirectoryOptions::parents())
        .await
        .unwrap();
    fs.write_file("/nested/deeper/data.txt", "payload")
        .await
        .unwrap();

    sandbox.assert_dir_exists("sandbox/nested/deeper");
    assert_eq!(sandbox.read_host_file("sandbox/nested/deeper/data.txt"), "payload");

    sandbox.write_host_file("sandbox/seeded.txt", "from host");
    assert_eq!(read_string(&fs, "/seeded.txt").await, "from host");
}

#[tokio::test]
async fn separate_facades_share_disk_state() {
    let sandbox = TestSandbox::new();
    let writer_fs = sandbox.fs("/shared");
    let reader_fs = sandbox.fs("/shared");

    writer_fs.write_file("/note.txt", "visible").await.unwrap();

    assert_eq!(read_string(&reader_fs, "/note.txt").await, "visible");
    assert!(
        !writer_fs
            .storage_handle()
            .await
            .unwrap()
            .same_handle(&reader_fs.storage_handle().await.unwrap())
    );
}
