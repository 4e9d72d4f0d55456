/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Per call options.
//!
//! Each struct turns into the parameter list for its endpoint. The embedded
//! [`CallOptions`] can override the access token pair for a single call; those
//! two values are used for signing and never sent as parameters.

use crate::v0::{ThumbnailFormat, ThumbnailSize};

/// Parameter list for a request
pub type ApiParams = Vec<(&'static str, String)>;

/// Converts an options struct into request parameters
pub trait ToParams {
    fn to_params(&self) -> ApiParams;
}

/// Options every call accepts
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Access token to use instead of the client's
    pub token: Option<String>,
    /// Access token secret to use instead of the client's
    pub secret: Option<String>,
}

impl CallOptions {
    pub fn with_token(token: &str, secret: &str) -> Self {
        Self {
            token: Some(token.into()),
            secret: Some(secret.into()),
        }
    }
}

impl ToParams for CallOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = ApiParams::new();
        push_opt(&mut params, "token", self.token.clone());
        push_opt(&mut params, "secret", self.secret.clone());
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountOptions {
    pub call: CallOptions,
    pub status_in_response: Option<bool>,
}

impl ToParams for AccountOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        push_opt(&mut params, "status_in_response", self.status_in_response);
        params
    }
}

/// Fields for creating a new account
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub call: CallOptions,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub status_in_response: Option<bool>,
}

impl ToParams for NewAccount {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        params.push(("email", self.email.clone()));
        params.push(("first_name", self.first_name.clone()));
        params.push(("last_name", self.last_name.clone()));
        params.push(("password", self.password.clone()));
        push_opt(&mut params, "status_in_response", self.status_in_response);
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetFileOptions {
    pub call: CallOptions,
    /// Revision of the file to fetch
    pub rev: Option<String>,
    /// Byte range, start and optional inclusive end. Sent as a `Range` header.
    pub range: Option<(u64, Option<u64>)>,
}

impl GetFileOptions {
    pub fn range_header(&self) -> Option<String> {
        self.range.map(|(start, end)| match end {
            Some(end) => format!("bytes={start}-{end}"),
            None => format!("bytes={start}-"),
        })
    }
}

impl ToParams for GetFileOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        push_opt(&mut params, "rev", self.rev.clone());
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub call: CallOptions,
    pub overwrite: Option<bool>,
    pub parent_rev: Option<String>,
}

impl ToParams for PutOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        push_opt(&mut params, "overwrite", self.overwrite);
        push_opt(&mut params, "parent_rev", self.parent_rev.clone());
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetadataOptions {
    pub call: CallOptions,
    pub file_limit: Option<u32>,
    /// Hash from an earlier listing, the server answers 304 when unchanged
    pub hash: Option<String>,
    pub list: Option<bool>,
    pub include_deleted: Option<bool>,
    pub rev: Option<String>,
}

impl ToParams for MetadataOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        push_opt(&mut params, "file_limit", self.file_limit);
        push_opt(&mut params, "hash", self.hash.clone());
        push_opt(&mut params, "list", self.list);
        push_opt(&mut params, "include_deleted", self.include_deleted);
        push_opt(&mut params, "rev", self.rev.clone());
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThumbnailOptions {
    pub call: CallOptions,
    pub size: Option<ThumbnailSize>,
    pub format: Option<ThumbnailFormat>,
}

impl ToParams for ThumbnailOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        if let Some(size) = self.size {
            let size: &'static str = size.into();
            params.push(("size", size.into()));
        }
        if let Some(format) = self.format {
            let format: &'static str = format.into();
            params.push(("format", format.into()));
        }
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub call: CallOptions,
    pub query: String,
    pub file_limit: Option<u32>,
    pub include_deleted: Option<bool>,
}

impl SearchOptions {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

impl ToParams for SearchOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        params.push(("query", self.query.clone()));
        push_opt(&mut params, "file_limit", self.file_limit);
        push_opt(&mut params, "include_deleted", self.include_deleted);
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeltaOptions {
    pub call: CallOptions,
    /// Cursor from the previous page, None to start from scratch
    pub cursor: Option<String>,
}

impl ToParams for DeltaOptions {
    fn to_params(&self) -> ApiParams {
        let mut params = self.call.to_params();
        push_opt(&mut params, "cursor", self.cursor.clone());
        params
    }
}

fn push_opt<T: ToString>(params: &mut ApiParams, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        params.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v0::signer::stringify_params;

    #[test]
    fn token_overrides_stay_off_the_wire() {
        let opts = SearchOptions {
            call: CallOptions::with_token("t", "s"),
            ..SearchOptions::new("x")
        };
        let params = opts.to_params();
        assert!(params.contains(&("token", "t".to_string())));
        assert_eq!(stringify_params(&params), "query=x");
    }

    #[test]
    fn range_header_forms() {
        let mut opts = GetFileOptions::default();
        assert_eq!(opts.range_header(), None);
        opts.range = Some((10, None));
        assert_eq!(opts.range_header().as_deref(), Some("bytes=10-"));
        opts.range = Some((0, Some(99)));
        assert_eq!(opts.range_header().as_deref(), Some("bytes=0-99"));
    }

    #[test]
    fn metadata_params_skip_unset() {
        let opts = MetadataOptions {
            list: Some(false),
            file_limit: Some(100),
            ..Default::default()
        };
        assert_eq!(
            opts.to_params(),
            vec![("file_limit", "100".to_string()), ("list", "false".to_string())]
        );
    }
}
