/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::v0::errors::DropboxError;
use async_stream::try_stream;
use bytes::Bytes;
use futures::Stream;

/// A download whose body arrives incrementally.
///
/// The response headers have been received and the status checked. The body
/// must be consumed before the handle is dropped or the connection is closed.
#[derive(Debug)]
pub struct FileStream {
    response: reqwest::Response,
}

impl FileStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// Size announced by the server, if any
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Next chunk of the body, None once it is exhausted
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, DropboxError> {
        Ok(self.response.chunk().await?)
    }

    /// Turns the handle into a stream of chunks
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Bytes, DropboxError>> {
        try_stream! {
            while let Some(chunk) = self.next_chunk().await? {
                yield chunk;
            }
        }
    }
}
