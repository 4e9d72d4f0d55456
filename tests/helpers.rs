/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use dropbox_oauth1::v0::{Client, ClientConfig, Creds};

#[allow(dead_code)]
pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub(crate) fn full_creds() -> Creds {
    Creds::from_tokens(
        "consumer-key",
        Some("consumer-secret"),
        Some("access-token"),
        Some("access-secret"),
    )
}

#[allow(dead_code)]
pub(crate) fn consumer_creds() -> Creds {
    Creds::from_tokens("consumer-key", Some("consumer-secret"), None, None)
}

/// Client pointed at a mock server for both hosts
#[allow(dead_code)]
pub(crate) fn mock_client(server: &mockito::Server, creds: Creds) -> Client {
    Client::with_config(creds, ClientConfig::with_origin(&server.url()))
}

#[allow(dead_code)]
pub(crate) fn file_json(path: &str) -> String {
    format!(
        r#"{{"size": "5 bytes", "rev": "1f2e3d", "thumb_exists": false, "bytes": 5,
            "modified": "Tue, 19 Jul 2011 21:55:38 +0000", "path": "{path}",
            "is_dir": false, "icon": "page_white_text", "root": "dropbox",
            "mime_type": "text/plain", "revision": 31}}"#
    )
}

// Reads live credentials from the environment (.env supported)
#[allow(dead_code)]
pub(crate) fn live_creds() -> anyhow::Result<Creds> {
    dotenvy::dotenv().ok();
    Ok(Creds::from_env()?)
}
