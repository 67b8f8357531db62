//! Chunked file transfer against a real server and filesystem.

use std::sync::Arc;
use std::time::Duration;

use hostlink_client::{ClientConfig, Computer};
use hostlink_server::{LocalFilesystem, Platform};
use hostlink_test_utils::TestServer;

const WAIT: Duration = Duration::from_secs(30);

/// Deterministic non-repeating test pattern.
fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 251) % 251) as u8).collect()
}

async fn fixture(threshold: u64, chunk_size: u64) -> (tempfile::TempDir, TestServer, Computer) {
    let dir = tempfile::tempdir().unwrap();
    let platform =
        Platform::new().with_filesystem(Arc::new(LocalFilesystem::rooted(dir.path())));
    let server = TestServer::start(&platform, None).await.unwrap();

    let config = ClientConfig::direct(server.host(), server.port())
        .with_command_timeout(Duration::from_secs(10))
        .with_chunking(threshold, chunk_size);
    let computer = Computer::connect(config).unwrap();
    (dir, server, computer)
}

#[tokio::test]
async fn small_file_goes_in_one_envelope() {
    let (_dir, server, computer) = fixture(64 * 1024, 16 * 1024).await;
    let data = pattern(1000);

    tokio::time::timeout(WAIT, async {
        computer.write_file("small.bin", &data, false).await.unwrap();
        let read = computer.read_file("small.bin").await.unwrap();
        assert_eq!(read, data);
    })
    .await
    .unwrap();

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn large_file_round_trips_in_chunks() {
    let (_dir, server, computer) = fixture(64 * 1024, 16 * 1024).await;
    // 200 KiB: 13 chunks, last one partial.
    let data = pattern(200 * 1024);

    tokio::time::timeout(WAIT, async {
        computer.write_file("large.bin", &data, false).await.unwrap();
        assert_eq!(
            computer.get_file_size("large.bin").await.unwrap(),
            data.len() as u64
        );
        let read = computer.read_file("large.bin").await.unwrap();
        assert_eq!(read, data);
    })
    .await
    .unwrap();

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn chunk_size_exactly_dividing_file() {
    let (_dir, server, computer) = fixture(16 * 1024, 32 * 1024).await;
    // 128 KiB with 32 KiB chunks: 4 full chunks, no remainder.
    let data = pattern(128 * 1024);

    tokio::time::timeout(WAIT, async {
        computer.write_file("even.bin", &data, false).await.unwrap();
        let read = computer.read_file("even.bin").await.unwrap();
        assert_eq!(read, data);
    })
    .await
    .unwrap();

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn chunked_append_extends_existing_content() {
    let (_dir, server, computer) = fixture(4 * 1024, 4 * 1024).await;
    let head = pattern(2 * 1024);
    let tail = pattern(10 * 1024);

    tokio::time::timeout(WAIT, async {
        computer.write_file("log.bin", &head, false).await.unwrap();
        computer.write_file("log.bin", &tail, true).await.unwrap();

        let read = computer.read_file("log.bin").await.unwrap();
        let mut expected = head.clone();
        expected.extend_from_slice(&tail);
        assert_eq!(read, expected);
    })
    .await
    .unwrap();

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn chunked_overwrite_truncates_previous_content() {
    let (_dir, server, computer) = fixture(4 * 1024, 4 * 1024).await;
    let long = pattern(20 * 1024);
    let short = pattern(6 * 1024);

    tokio::time::timeout(WAIT, async {
        computer.write_file("f.bin", &long, false).await.unwrap();
        computer.write_file("f.bin", &short, false).await.unwrap();

        assert_eq!(
            computer.get_file_size("f.bin").await.unwrap(),
            short.len() as u64
        );
        let read = computer.read_file("f.bin").await.unwrap();
        assert_eq!(read, short);
    })
    .await
    .unwrap();

    computer.close();
    server.stop().await;
}

#[tokio::test]
async fn byte_range_reads_match_offsets() {
    let (_dir, server, computer) = fixture(u64::MAX, 4 * 1024).await;
    let data = pattern(10 * 1024);

    tokio::time::timeout(WAIT, async {
        computer.write_file("range.bin", &data, false).await.unwrap();

        let mid = computer
            .read_bytes("range.bin", Some(4096), Some(1024))
            .await
            .unwrap();
        assert_eq!(mid, &data[4096..5120]);

        // Range past EOF returns the tail.
        let tail = computer
            .read_bytes("range.bin", Some(data.len() as u64 - 100), Some(4096))
            .await
            .unwrap();
        assert_eq!(tail, &data[data.len() - 100..]);
    })
    .await
    .unwrap();

    computer.close();
    server.stop().await;
}
