/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! OAuth1 (HMAC-SHA1) request signing and the path/query escaping rules the
//! Dropbox API expects.

use crate::v0::creds::Creds;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::borrow::Cow;
use url::Url;

pub const OAUTH_VERSION: &str = "1.0";
pub const OAUTH_SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Option keys that only route credentials and are never sent on the wire
pub const RESERVED_PARAMS: [&str; 2] = ["token", "secret"];

/// RFC 3986 percent encoding. Only `A-Z a-z 0-9 - . _ ~` pass through, so
/// `!`, `(`, `)`, `*` and `'` are always escaped.
pub fn percent_encode(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Escapes each segment of a slash separated path independently.
///
/// A single leading slash is dropped so the result can be joined onto an
/// endpoint template without doubling the separator.
pub fn escape_path(path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.split('/')
        .map(percent_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Serializes options into a query string, skipping the reserved keys
pub fn stringify_params<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .iter()
        .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| {
            format!(
                "{}={}",
                percent_encode(k.as_ref()),
                percent_encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The per request values OAuth mixes into the signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthNonce {
    pub nonce: String,
    pub timestamp: i64,
}

impl OAuthNonce {
    /// Fresh nonce and current timestamp
    pub fn generate() -> Self {
        Self {
            nonce: format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>()),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Computes OAuth1 signatures for a given credential record
#[derive(Debug)]
pub struct OAuthSigner<'a> {
    creds: &'a Creds,
}

impl<'a> OAuthSigner<'a> {
    pub fn new(creds: &'a Creds) -> Self {
        Self { creds }
    }

    /// The `oauth_*` protocol parameters, excluding the signature itself
    pub fn protocol_params(&self, nonce: &OAuthNonce) -> Vec<(String, String)> {
        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.creds.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.nonce.clone()),
            (
                "oauth_signature_method".to_string(),
                OAUTH_SIGNATURE_METHOD.to_string(),
            ),
            ("oauth_timestamp".to_string(), nonce.timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = self.creds.access_token.as_deref().filter(|t| !t.is_empty()) {
            params.push(("oauth_token".to_string(), token.to_string()));
        }
        params
    }

    /// Builds the signature base string: `METHOD&base-uri&normalized-params`
    pub fn base_string(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        nonce: &OAuthNonce,
    ) -> String {
        let mut all: Vec<(String, String)> = params
            .iter()
            .chain(self.protocol_params(nonce).iter())
            .map(|(k, v)| (percent_encode(k).into_owned(), percent_encode(v).into_owned()))
            .collect();
        // Query pairs already on the url take part in the signature as well
        all.extend(
            url.query_pairs()
                .map(|(k, v)| (percent_encode(&k).into_owned(), percent_encode(&v).into_owned())),
        );
        all.sort();

        let normalized = all
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            percent_encode(&base_uri(url)),
            percent_encode(&normalized)
        )
    }

    /// HMAC-SHA1 over the base string, base64 encoded.
    ///
    /// The key is `consumer_secret&token_secret`; either half may be empty.
    pub fn signature(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        nonce: &OAuthNonce,
    ) -> String {
        let key = format!(
            "{}&{}",
            percent_encode(&self.creds.consumer_secret),
            percent_encode(self.creds.access_token_secret.as_deref().unwrap_or_default())
        );
        let base = self.base_string(method, url, params, nonce);
        log::trace!("OAuth base string: {base}");

        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC takes keys of any size"));
        mac.update(base.as_bytes());
        BASE64_STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Renders the full `Authorization` header value
    pub fn authorization_header(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        nonce: &OAuthNonce,
    ) -> String {
        let signature = self.signature(method, url, params, nonce);
        let mut fields = self.protocol_params(nonce);
        fields.push(("oauth_signature".to_string(), signature));
        let rendered = fields
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {rendered}")
    }
}

/// `scheme://host[:port]/path` with the default port and any query removed
fn base_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}
