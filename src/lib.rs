/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! # Dropbox OAuth1
//!
//! This library was created for working with the OAuth1 flavored Dropbox REST
//! API (`/0` endpoints).
//!
//! For further details on the Rest API refer to the [Dropbox API Docs](https://www.dropbox.com/developers/docs)
//!
//! ## Features
//!
//! - Token exchange from email/password, account info and account creation
//! - File download (buffered or streamed) and upload (multipart or raw PUT)
//! - Metadata, thumbnails and search
//! - Copy, move, delete and create folder
//! - Delta paging plus a [`v0::ChangePoller`] that turns it into change events
//! - Lower level interface for handling the raw communication
//!
//! *The API uses OAuth1. This library handles the request signing (HMAC-SHA1).*
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! dropbox-oauth1 = "0.3.0"
//! ```
//!
//! ## Usage
//!
//! **You will need to acquire a consumer key/secret from Dropbox prior to using the API**
//!
//! ```rust,no_run
//! use dropbox_oauth1::v0::{ChangePoller, Client, Creds, MetadataOptions, PollEvent, PollerConfig};
//!
//!async fn watch_folder(
//!    consumer_key: &str,
//!    consumer_secret: &str,
//!    email: &str,
//!    password: &str,
//!) -> anyhow::Result<()> {
//!    let client = Client::new(Creds::from_tokens(consumer_key, Some(consumer_secret), None, None));
//!
//!    // Exchange the user's login for an access token pair, stored in the client
//!    client.get_access_token(email, password).await?;
//!
//!    // List the root folder
//!    let root = client.metadata("/", &MetadataOptions::default()).await?;
//!    for entry in &root.contents {
//!        println!("{entry}");
//!    }
//!
//!    // Follow changes from here on
//!    let poller = ChangePoller::new(client.clone(), PollerConfig::default());
//!    let mut events = poller.subscribe();
//!    poller.start()?;
//!    while let Some(event) = events.recv().await {
//!        match event {
//!            PollEvent::Data(entry) => println!("changed: {}", entry.path),
//!            PollEvent::Reset => println!("reset"),
//!            PollEvent::Error(err) => eprintln!("poll failed: {err}"),
//!        }
//!    }
//!    Ok(())
//!}
//! ```
//!
pub mod v0;
