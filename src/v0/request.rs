/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::creds::Creds;
use crate::v0::errors::DropboxError;
use crate::v0::signer::{OAuthNonce, OAuthSigner, RESERVED_PARAMS, stringify_params};
use bytes::Bytes;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use url::Url;

/// Body attached to a request
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Raw bytes sent with the given content type
    Raw { data: Bytes, content_type: String },
    /// A single `multipart/form-data` part named `file`
    Multipart { filename: String, data: Bytes },
}

impl RequestBody {
    pub fn multipart(filename: &str, data: Bytes) -> Self {
        RequestBody::Multipart {
            filename: filename.into(),
            data,
        }
    }

    fn attach(
        self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, DropboxError> {
        match self {
            RequestBody::Raw { data, content_type } => Ok(builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(data)),
            RequestBody::Multipart { filename, data } => {
                // Known length parts keep the upload out of chunked encoding
                let part = Part::bytes(data.to_vec())
                    .file_name(filename)
                    .mime_str("application/octet-stream")?;
                Ok(builder.multipart(Form::new().part("file", part)))
            }
        }
    }
}

/// Everything needed to sign and issue one API call.
///
/// Parameters keep insertion order and keys are unique: setting a key twice
/// replaces the earlier value in place.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    params: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            params: Vec::new(),
            body: None,
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
        self
    }

    pub fn params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        params
            .into_iter()
            .fold(self, |req, (k, v)| req.param(k.as_ref(), v))
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Signs using a fresh nonce and the current time
    pub fn sign(self, creds: &Creds) -> SignedRequest {
        self.sign_with(creds, &OAuthNonce::generate())
    }

    /// Signs with the provided nonce. The descriptor is consumed so the
    /// signed request can no longer change.
    pub fn sign_with(self, creds: &Creds, nonce: &OAuthNonce) -> SignedRequest {
        let wire_params: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
            .cloned()
            .collect();
        let authorization = OAuthSigner::new(creds).authorization_header(
            self.method.as_str(),
            &self.url,
            &wire_params,
            nonce,
        );
        let mut url = self.url;
        let query = stringify_params(&self.params);
        if !query.is_empty() {
            // Pairs already on the base url were signed too, keep them
            let merged = match url.query().filter(|q| !q.is_empty()) {
                Some(existing) => format!("{existing}&{query}"),
                None => query,
            };
            url.set_query(Some(&merged));
        }
        SignedRequest {
            method: self.method,
            url,
            authorization,
            body: self.body,
        }
    }
}

/// A signed, ready to send request
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: Url,
    authorization: String,
    body: Option<RequestBody>,
}

impl SignedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full url including the serialized query string
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    pub fn into_reqwest(
        self,
        client: &reqwest::Client,
    ) -> Result<reqwest::RequestBuilder, DropboxError> {
        let builder = client
            .request(self.method, self.url)
            .header(reqwest::header::AUTHORIZATION, self.authorization);
        match self.body {
            Some(body) => body.attach(builder),
            None => Ok(builder),
        }
    }
}
