use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::response::Response;
use http_body_util::BodyExt;
use reel_axum::{axum, stream_router, AxumApp, StreamState};
use reel_blob::{GatewayConfig, MediaGateway, MemoryBlobStore, ObjectLocator};
use reel_core::ReelApp;
use serde_json::Value;
use tower::ServiceExt;

const BUCKET: &str = "course-media";

fn clip() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 256) as u8).collect()
}

async fn app_with_store() -> (AxumApp, MemoryBlobStore) {
    let store = MemoryBlobStore::new().with_chunk_size(128);
    store
        .insert(
            ObjectLocator::from_path(BUCKET, "module-1", "intro.mp4"),
            clip(),
            Some("video/mp4"),
        )
        .await;
    store
        .insert(
            ObjectLocator::from_path(BUCKET, "module-1", "notes.bin"),
            &b"untyped"[..],
            None,
        )
        .await;

    let gateway = MediaGateway::new(store.clone(), GatewayConfig::default());
    let ax = axum(ReelApp::new())
        .use_router("/stream", stream_router(StreamState::new(gateway, BUCKET)))
        .with_request_tracing();
    (ax, store)
}

async fn get(ax: &AxumApp, uri: &str, range: Option<&str>) -> Response {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(range) = range {
        req = req.header("range", range);
    }
    ax.router
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(res: Response) -> Vec<u8> {
    res.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn json_body(res: Response) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}

fn header<'a>(res: &'a Response, name: &str) -> &'a str {
    res.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn whole_object_is_streamed_with_200() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/intro.mp4", None).await;

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(header(&res, "content-type"), "video/mp4");
    assert_eq!(header(&res, "content-length"), "1000");
    assert_eq!(header(&res, "cache-control"), "public, max-age=31536000");
    assert!(res.headers().get("content-range").is_none());
    assert_eq!(body_bytes(res).await, clip());
}

#[tokio::test]
async fn range_request_returns_partial_content() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/intro.mp4", Some("bytes=100-299")).await;

    assert_eq!(res.status().as_u16(), 206);
    assert_eq!(header(&res, "content-range"), "bytes 100-299/1000");
    assert_eq!(header(&res, "accept-ranges"), "bytes");
    assert_eq!(header(&res, "content-length"), "200");
    assert_eq!(header(&res, "cache-control"), "public, max-age=31536000");
    assert_eq!(body_bytes(res).await, clip()[100..300].to_vec());
}

#[tokio::test]
async fn open_ended_range_runs_to_the_last_byte() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/intro.mp4", Some("bytes=990-")).await;

    assert_eq!(res.status().as_u16(), 206);
    assert_eq!(header(&res, "content-range"), "bytes 990-999/1000");
    assert_eq!(body_bytes(res).await, clip()[990..].to_vec());
}

#[tokio::test]
async fn unsatisfiable_range_returns_416() {
    let (ax, store) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/intro.mp4", Some("bytes=1000-1010")).await;

    assert_eq!(res.status().as_u16(), 416);
    assert_eq!(header(&res, "content-range"), "bytes */1000");
    let body = json_body(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(store.get_calls(), 0);
}

#[tokio::test]
async fn malformed_range_returns_416() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/intro.mp4", Some("bytes=abc")).await;

    assert_eq!(res.status().as_u16(), 416);
    assert_eq!(header(&res, "content-range"), "bytes */1000");
}

#[tokio::test]
async fn missing_object_returns_404_payload() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/missing.mp4", None).await;

    assert_eq!(res.status().as_u16(), 404);
    let body = json_body(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Video not found");
}

#[tokio::test]
async fn untyped_objects_default_to_video_mp4() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/notes.bin", None).await;

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(header(&res, "content-type"), "video/mp4");
}

#[tokio::test]
async fn signed_url_uses_default_ttl() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2-url/module-1/intro.mp4", None).await;

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["expiresIn"], 3600);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("memory://course-media/module-1/intro.mp4?X-Reel-Expires=3600"));
}

#[tokio::test]
async fn signed_url_honours_expires_query() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2-url/module-1/intro.mp4?expires=120", None).await;

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["expiresIn"], 120);
}

#[tokio::test]
async fn signing_failure_returns_500_payload() {
    let (ax, store) = app_with_store().await;
    store.set_fail_signing(true);

    let res = get(&ax, "/stream/r2-url/module-1/intro.mp4", None).await;

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to generate streaming URL");
}

#[tokio::test]
async fn bad_expires_values_return_400() {
    let (ax, _) = app_with_store().await;

    for uri in [
        "/stream/r2-url/module-1/intro.mp4?expires=soon",
        "/stream/r2-url/module-1/intro.mp4?expires=0",
        "/stream/r2-url/module-1/intro.mp4?expires=604801",
    ] {
        let res = get(&ax, uri, None).await;
        assert_eq!(res.status().as_u16(), 400, "{uri}");
        assert_eq!(json_body(res).await["success"], false, "{uri}");
    }
}

#[tokio::test]
async fn request_id_is_generated_and_preserved() {
    let (ax, _) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/intro.mp4", None).await;
    assert!(res.headers().get("x-request-id").is_some());

    let provided = HeaderValue::from_static("req-test-123");
    let res = ax
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/stream/r2/module-1/missing.mp4")
                .header("x-request-id", provided.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    assert_eq!(res.headers().get("x-request-id"), Some(&provided));
}

#[tokio::test]
async fn dropping_the_response_body_releases_the_upstream_stream() {
    let (ax, store) = app_with_store().await;

    let res = get(&ax, "/stream/r2/module-1/intro.mp4", None).await;
    assert_eq!(store.live_streams(), 1);
    drop(res);
    assert_eq!(store.live_streams(), 0);
}
