/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

pub mod api;
pub mod client;
pub mod creds;
pub mod errors;
pub mod metadata;
pub mod options;
mod parsers;
pub mod poller;
pub mod properties;
pub mod request;
pub mod signer;
pub mod stream;

pub use api::*;
pub use client::*;
pub use creds::*;
pub use errors::*;
pub use metadata::*;
pub use options::*;
pub use poller::*;
pub use properties::*;
pub use stream::*;
