mod app;
mod store;

use std::sync::Arc;

use reel_axum::{axum, stream_router, AxumApp, StreamState};
use reel_blob::{MediaGateway, SignedUrlBlobStore};
use reel_core::ReelApp;
use tower_http::cors::{Any, CorsLayer};

pub use app::{apply_defaults, gateway_app, ENV_PREFIX};
pub use store::{build_store, gateway_config};

/// Build the gateway from environment configuration.
pub async fn build() -> anyhow::Result<AxumApp> {
    let app = gateway_app();
    let store = build_store(&app.config_snapshot()).await?;
    build_with_store(app, store)
}

/// Build the gateway around an already constructed store.
pub fn build_with_store(
    app: ReelApp,
    store: Arc<dyn SignedUrlBlobStore>,
) -> anyhow::Result<AxumApp> {
    apply_defaults(&app);
    let cfg = app.config_snapshot();

    let gateway = MediaGateway::from_shared(store, gateway_config(&cfg));
    let bucket = store::bucket(&cfg);
    tracing::info!(%bucket, "media gateway ready");

    let mut ax = axum(app)
        .use_router("/stream", stream_router(StreamState::new(gateway, bucket)))
        .service("/health", || async { "ok" })
        .with_request_tracing();

    if cfg.get_bool("cors.allow_any_origin").unwrap_or(true) {
        ax.router = ax.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        );
    }

    Ok(ax)
}
