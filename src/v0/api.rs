/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::creds::Creds;
use crate::v0::errors::DropboxError;
use crate::v0::options::ApiParams;
use crate::v0::request::{RequestBody, RequestDescriptor};
use bytes::Bytes;
use num_enum::TryFromPrimitive;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use url::Url;

// Metadata and account API
pub const API_ORIGIN: &str = "https://api.dropbox.com";

// Upload and download API
pub const CONTENT_ORIGIN: &str = "https://api-content.dropbox.com";

pub const API_VERSION: &str = "0";

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Which credentials a request must be signed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Consumer pair only, used for the token exchange
    Consumer,
    /// Consumer pair plus a non-empty access token pair
    AccessToken,
}

/// A not yet signed call
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    params: ApiParams,
    body: Option<RequestBody>,
    range: Option<String>,
    auth: AuthMode,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            params: ApiParams::new(),
            body: None,
            range: None,
            auth: AuthMode::AccessToken,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn params(mut self, params: ApiParams) -> Self {
        self.params.extend(params);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn range(mut self, range: Option<String>) -> Self {
        self.range = range;
        self
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }
}

/// Directly communicates with the API.
///
/// Owns the credential record. The access token pair is the only mutable
/// piece and is replaced after a successful token exchange.
pub struct ApiClient {
    creds: RwLock<Creds>,
    user_agent: String,
    https_client: reqwest::Client,
}

impl ApiClient {
    pub fn new(creds: Creds) -> Self {
        Self::with_user_agent(creds, USER_AGENT)
    }

    pub fn with_user_agent(creds: Creds, user_agent: &str) -> Self {
        Self {
            creds: RwLock::new(creds),
            user_agent: user_agent.into(),
            https_client: reqwest::Client::new(),
        }
    }

    /// Snapshot of the current credentials
    pub fn creds(&self) -> Creds {
        self.creds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn set_token_pair(&self, token: &str, secret: &str) {
        self.creds
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .set_token_pair(token, secret);
    }

    /// Pulls the `token`/`secret` overrides out of the parameters and returns
    /// the credentials to sign with.
    fn resolve_creds(&self, params: &mut ApiParams, auth: AuthMode) -> Result<Creds, DropboxError> {
        let mut token = None;
        let mut secret = None;
        params.retain(|(k, v)| match *k {
            "token" => {
                token = Some(v.clone());
                false
            }
            "secret" => {
                secret = Some(v.clone());
                false
            }
            _ => true,
        });
        let creds = self.creds().with_overrides(token, secret);
        if auth == AuthMode::AccessToken && creds.token_pair().is_none() {
            return Err(DropboxError::Config(
                "an access token and secret are required for this call".into(),
            ));
        }
        Ok(creds)
    }

    /// Signs and sends the request. Non 2xx responses become
    /// [`DropboxError::ApiResponse`].
    pub async fn send(&self, req: ApiRequest) -> Result<reqwest::Response, DropboxError> {
        let ApiRequest {
            method,
            url,
            mut params,
            body,
            range,
            auth,
        } = req;
        let creds = self.resolve_creds(&mut params, auth)?;

        log::debug!("{} {}", method, url.path());
        let mut descriptor = RequestDescriptor::new(method, url).params(params);
        if let Some(body) = body {
            descriptor = descriptor.body(body);
        }
        let mut builder = descriptor
            .sign(&creds)
            .into_reqwest(&self.https_client)?
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str());
        if let Some(range) = range {
            builder = builder.header(reqwest::header::RANGE, range);
        }

        let resp = builder.send().await?;
        check_status(resp).await
    }

    /// Sends the request and parses the JSON response.
    ///
    /// The body is parsed whatever the declared content type: the API serves
    /// JSON as `text/javascript` on several endpoints and as `text/plain` on
    /// uploads. A body that is not JSON is reported as malformed.
    pub async fn json<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, DropboxError> {
        let resp = self.send(req).await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if let Some(content_type) = content_type.as_deref().filter(|ct| !is_json_type(ct)) {
            log::debug!("Parsing {content_type} response as JSON");
        }
        let body = resp.bytes().await?;
        serde_json::from_slice::<T>(&body).map_err(|err| {
            log::error!("Api Malformed Err {:?}", err);
            DropboxError::ApiResponseMalformed(err)
        })
    }

    /// Sends the request and returns the raw response body
    pub async fn bytes(&self, req: ApiRequest) -> Result<Bytes, DropboxError> {
        Ok(self.send(req).await?.bytes().await?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("creds", &self.creds())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, DropboxError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = match resp.text().await {
        Ok(body) => body,
        Err(err) => {
            log::warn!("Unable to read the body of a {} response: {}", status.as_u16(), err);
            String::new()
        }
    };
    let message = error_message(status.as_u16(), &body);
    log::warn!("API error {}: {}", status.as_u16(), message);
    Err(DropboxError::ApiResponse {
        status: status.as_u16(),
        message,
    })
}

// `application/json` and the `text/javascript` the API also uses for JSON
fn is_json_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.ends_with("/json") || mime.ends_with("+json") || mime == "text/javascript"
}

/// Known codes map to a fixed message. Anything else surfaces the `error`
/// field of a JSON body or the raw body.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(code) = ApiErrorCodes::try_from(status) {
        return code.message().to_string();
    }
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error").map(|e| match e.as_str() {
                Some(s) => s.to_string(),
                None => e.to_string(),
            })
        })
        .unwrap_or_else(|| body.to_string())
}

/// Error codes with a documented meaning per the Dropbox API site
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u16)]
pub enum ApiErrorCodes {
    NotModified = 304,
    IgnoredExtension = 400,
    InvalidOperation = 403,
    NotFound = 404,
    TooManyEntries = 406,
    ChunkedEncoding = 411,
    InvalidImage = 415,
}

impl ApiErrorCodes {
    pub fn message(&self) -> &'static str {
        use ApiErrorCodes as E;
        match self {
            E::NotModified => "The folder contents have not changed.",
            E::IgnoredExtension => "The extension is on Dropbox's ignore list.",
            E::InvalidOperation => {
                "An invalid copy operation was attempted (e.g. there is already a file at the \
                 given destination, or copying a shared folder into a shared folder)."
            }
            E::NotFound => "The requested file or revision was not found.",
            E::TooManyEntries => "There are too many file entries to return.",
            E::ChunkedEncoding => {
                "Chunked encoding was attempted for this upload, but is not supported by Dropbox."
            }
            E::InvalidImage => "The image is invalid and cannot be converted to a thumbnail.",
        }
    }
}
