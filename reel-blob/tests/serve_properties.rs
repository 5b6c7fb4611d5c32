use futures_util::StreamExt;
use reel_blob::prelude::*;
use tokio_test::assert_ok;

const SIZE: usize = 4096;

fn video() -> Vec<u8> {
    (0..SIZE).map(|i| (i * 31 % 251) as u8).collect()
}

async fn setup() -> (MemoryBlobStore, MediaGateway, ObjectLocator) {
    let store = MemoryBlobStore::new().with_chunk_size(500);
    let locator = ObjectLocator::from_path("course-media", "module-1", "lesson-3.mp4");
    store.insert(locator.clone(), video(), Some("video/mp4")).await;
    let gateway = MediaGateway::new(store.clone(), GatewayConfig::default());
    (store, gateway, locator)
}

async fn read_all(served: ServedObject) -> Vec<u8> {
    let mut stream = served.stream;
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&assert_ok!(chunk));
    }
    out
}

#[tokio::test]
async fn whole_object_reads_are_repeatable() {
    let (_, gateway, locator) = setup().await;

    let first = assert_ok!(gateway.serve_object(&locator, None).await);
    assert_eq!(first.status_code(), 200);
    assert_eq!(first.content_length(), SIZE as u64);
    let first = read_all(first).await;

    let second = read_all(assert_ok!(gateway.serve_object(&locator, None).await)).await;
    assert_eq!(first, video());
    assert_eq!(first, second);
}

#[tokio::test]
async fn served_length_matches_header_for_assorted_ranges() {
    let (_, gateway, locator) = setup().await;
    let data = video();

    let cases = [
        ("bytes=0-0", 0, 0),
        ("bytes=10-19", 10, 19),
        ("bytes=499-501", 499, 501),
        ("bytes=100-", 100, SIZE - 1),
        ("bytes=-24", SIZE - 24, SIZE - 1),
        ("bytes=4000-999999", 4000, SIZE - 1),
    ];

    for (header, start, end) in cases {
        let served = assert_ok!(gateway.serve_object(&locator, Some(header)).await);
        assert_eq!(served.status_code(), 206, "{header}");
        assert_eq!(
            served.content_range(),
            Some(format!("bytes {}-{}/{}", start, end, SIZE)),
            "{header}"
        );
        assert_eq!(served.content_length(), (end - start + 1) as u64, "{header}");
        assert_eq!(read_all(served).await, data[start..=end].to_vec(), "{header}");
    }
}

#[tokio::test]
async fn range_starting_at_size_is_rejected_before_any_read() {
    let (store, gateway, locator) = setup().await;

    let header = format!("bytes={}-{}", SIZE, SIZE + 10);
    let err = gateway.serve_object(&locator, Some(&header)).await.unwrap_err();

    assert!(matches!(err, GatewayError::RangeNotSatisfiable { size, .. } if size == SIZE as u64));
    assert_eq!(store.get_calls(), 0);
    assert_eq!(store.live_streams(), 0);
}

#[tokio::test]
async fn removed_object_turns_into_not_found() {
    let (store, gateway, locator) = setup().await;
    assert!(store.remove(&locator).await);

    let err = gateway.serve_object(&locator, Some("bytes=0-1")).await.unwrap_err();
    assert!(matches!(err, GatewayError::ObjectNotFound { .. }));
}
