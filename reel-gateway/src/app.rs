use reel_core::{load_env_config, ReelApp};

pub const ENV_PREFIX: &str = "REEL__";

/// Application container with defaults applied, then `REEL__*` overrides.
pub fn gateway_app() -> ReelApp {
    let app = ReelApp::new();
    apply_defaults(&app);
    let applied = load_env_config(&app, ENV_PREFIX);
    tracing::debug!(applied, "loaded environment configuration");
    app
}

pub fn apply_defaults(app: &ReelApp) {
    app.set_default("http.host", "127.0.0.1");
    app.set_default("http.port", "3030");

    app.set_default("store.backend", "s3");
    app.set_default("store.bucket", "course-media");

    app.set_default("s3.region", "auto");
    app.set_default("s3.force_path_style", "true");

    app.set_default("gateway.default_content_type", "video/mp4");
    app.set_default("gateway.cache_control", "public, max-age=31536000");
    app.set_default("gateway.signed_url_ttl_secs", "3600");
    app.set_default("gateway.max_signed_url_ttl_secs", "604800");
    app.set_default("gateway.store_timeout_secs", "30");
    app.set_default("gateway.read_idle_timeout_secs", "60");

    app.set_default("cors.allow_any_origin", "true");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_do_not_clobber_explicit_values() {
        let app = ReelApp::new();
        app.set("http.port", "8080");
        apply_defaults(&app);

        assert_eq!(app.get("http.port").as_deref(), Some("8080"));
        assert_eq!(app.get("http.host").as_deref(), Some("127.0.0.1"));
        assert_eq!(app.get("store.bucket").as_deref(), Some("course-media"));
    }
}
