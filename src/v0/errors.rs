/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

use std::io;
use thiserror::Error;

/// Error conditions that can be returned
#[derive(Error, Debug)]
pub enum DropboxError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Request network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Configuration error. {0}")]
    Config(String),

    #[error("URL Parse error")]
    UrlParsing(#[from] url::ParseError),

    #[error("API Response was error: {status}, msg: {message}")]
    ApiResponse { status: u16, message: String },

    #[error("API Response is malformed: {0:?}")]
    ApiResponseMalformed(#[from] serde_json::Error),
}

impl DropboxError {
    /// HTTP status code when this is a protocol error
    pub fn status(&self) -> Option<u16> {
        match self {
            DropboxError::ApiResponse { status, .. } => Some(*status),
            DropboxError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
