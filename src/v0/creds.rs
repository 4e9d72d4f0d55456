/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::errors::DropboxError;

pub const ENV_CONSUMER_KEY: &str = "DROPBOX_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "DROPBOX_CONSUMER_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "DROPBOX_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "DROPBOX_ACCESS_TOKEN_SECRET";

/// OAuth1 credentials used to sign every request.
///
/// The consumer pair identifies the application and may be empty (the token
/// exchange still signs with empty secrets). The access pair identifies the
/// user and is filled in either by the caller or by
/// [`crate::v0::Client::get_access_token`].
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Creds {
    pub(crate) consumer_key: String,
    pub(crate) consumer_secret: String,
    pub(crate) access_token: Option<String>,
    pub(crate) access_token_secret: Option<String>,
}

impl Creds {
    /// Builds credentials from the raw tokens
    pub fn from_tokens(
        consumer_key: &str,
        consumer_secret: Option<&str>,
        access_token: Option<&str>,
        access_token_secret: Option<&str>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.unwrap_or_default().into(),
            access_token: access_token.map(Into::into),
            access_token_secret: access_token_secret.map(Into::into),
        }
    }

    /// Reads credentials from the `DROPBOX_*` environment variables.
    ///
    /// The consumer key is required; everything else is optional.
    pub fn from_env() -> Result<Self, DropboxError> {
        let consumer_key = std::env::var(ENV_CONSUMER_KEY)
            .map_err(|_| DropboxError::Config(format!("{ENV_CONSUMER_KEY} is not set")))?;
        let consumer_secret = std::env::var(ENV_CONSUMER_SECRET).ok();
        let access_token = std::env::var(ENV_ACCESS_TOKEN).ok();
        let access_token_secret = std::env::var(ENV_ACCESS_TOKEN_SECRET).ok();
        Ok(Self::from_tokens(
            &consumer_key,
            consumer_secret.as_deref(),
            access_token.as_deref(),
            access_token_secret.as_deref(),
        ))
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Returns the access token pair when both halves are present and non-empty
    pub fn token_pair(&self) -> Option<(&str, &str)> {
        match (&self.access_token, &self.access_token_secret) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                Some((token.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }

    pub(crate) fn set_token_pair(&mut self, token: &str, secret: &str) {
        self.access_token = Some(token.into());
        self.access_token_secret = Some(secret.into());
    }

    /// Returns a copy with the access pair replaced by the provided overrides
    pub(crate) fn with_overrides(&self, token: Option<String>, secret: Option<String>) -> Self {
        let mut creds = self.clone();
        if let Some(token) = token {
            creds.access_token = Some(token);
        }
        if let Some(secret) = secret {
            creds.access_token_secret = Some(secret);
        }
        creds
    }
}

impl std::fmt::Debug for Creds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creds")
            .field("consumer_key", &"xxx")
            .field("consumer_secret", &"xxx")
            .field("access_token", &self.access_token.as_ref().map(|_| "xxx"))
            .field(
                "access_token_secret",
                &self.access_token_secret.as_ref().map(|_| "xxx"),
            )
            .finish()
    }
}
