use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use reel_blob::{
    GatewayConfig, MemoryBlobStore, ObjectLocator, S3CompatibleStore, S3Config,
    SignedUrlBlobStore,
};
use reel_core::ReelConfigSnapshot;

/// Build the store selected by `store.backend`.
pub async fn build_store(cfg: &ReelConfigSnapshot) -> Result<Arc<dyn SignedUrlBlobStore>> {
    match cfg.get("store.backend").unwrap_or("s3") {
        "s3" => {
            let s3 = s3_config(cfg)?;
            tracing::info!(endpoint = ?s3.endpoint_url, region = %s3.region, "using s3 store");
            Ok(Arc::new(S3CompatibleStore::new(s3).await))
        }
        "memory" => {
            let store = MemoryBlobStore::new();
            if let Some(dir) = cfg.get("store.memory_seed_dir") {
                let bucket = bucket(cfg);
                let loaded = seed_memory_store(&store, &bucket, Path::new(dir)).await?;
                tracing::info!(dir, loaded, "seeded memory store");
            }
            tracing::warn!("using in-memory store; content is not persisted");
            Ok(Arc::new(store))
        }
        other => bail!("unknown store.backend {other:?} (expected \"s3\" or \"memory\")"),
    }
}

pub fn bucket(cfg: &ReelConfigSnapshot) -> String {
    cfg.get_string("store.bucket")
        .unwrap_or_else(|| "course-media".to_string())
}

pub fn s3_config(cfg: &ReelConfigSnapshot) -> Result<S3Config> {
    let access_key_id = cfg
        .get_string("s3.access_key_id")
        .ok_or_else(|| anyhow!("s3.access_key_id is required for the s3 backend"))?;
    let secret_access_key = cfg
        .get_string("s3.secret_access_key")
        .ok_or_else(|| anyhow!("s3.secret_access_key is required for the s3 backend"))?;

    let mut s3 = S3Config::new(access_key_id, secret_access_key)
        .with_force_path_style(cfg.get_bool("s3.force_path_style").unwrap_or(true));
    if let Some(region) = cfg.get_string("s3.region") {
        s3 = s3.with_region(region);
    }
    if let Some(endpoint) = cfg.get_string("s3.endpoint_url") {
        s3 = s3.with_endpoint_url(endpoint);
    }
    Ok(s3)
}

pub fn gateway_config(cfg: &ReelConfigSnapshot) -> GatewayConfig {
    let mut gw = GatewayConfig::default();
    if let Some(v) = cfg.get_string("gateway.default_content_type") {
        gw = gw.with_default_content_type(v);
    }
    if let Some(v) = cfg.get_string("gateway.cache_control") {
        gw = gw.with_cache_control(v);
    }
    if let Some(v) = cfg.get_u64("gateway.signed_url_ttl_secs") {
        gw = gw.with_default_signed_url_ttl(v);
    }
    if let Some(v) = cfg.get_u64("gateway.max_signed_url_ttl_secs") {
        gw = gw.with_max_signed_url_ttl(v);
    }
    if let Some(v) = cfg.get_duration_secs("gateway.store_timeout_secs") {
        gw = gw.with_store_timeout(v);
    }
    if let Some(v) = cfg.get_duration_secs("gateway.read_idle_timeout_secs") {
        gw = gw.with_read_idle_timeout(v);
    }
    gw
}

/// Load `{dir}/{folder}/{filename}` files into the store.
async fn seed_memory_store(store: &MemoryBlobStore, bucket: &str, dir: &Path) -> Result<usize> {
    let mut loaded = 0;
    let mut folders = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("reading seed dir {}", dir.display()))?;

    while let Some(folder) = folders.next_entry().await? {
        if !folder.file_type().await?.is_dir() {
            continue;
        }
        let folder_name = folder.file_name().to_string_lossy().into_owned();
        let mut files = tokio::fs::read_dir(folder.path()).await?;
        while let Some(file) = files.next_entry().await? {
            if !file.file_type().await?.is_file() {
                continue;
            }
            let file_name = file.file_name().to_string_lossy().into_owned();
            let data = tokio::fs::read(file.path()).await?;
            let content_type = content_type_for(&file_name);
            store
                .insert(
                    ObjectLocator::from_path(bucket, &folder_name, &file_name),
                    data,
                    content_type,
                )
                .await;
            loaded += 1;
        }
    }
    Ok(loaded)
}

/// Unknown extensions are left untyped and fall back to the gateway default.
fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "m3u8" => "application/vnd.apple.mpegurl",
        "ts" => "video/mp2t",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "vtt" => "text/vtt",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(content_type)
}
