/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

extern crate dropbox_oauth1;

use anyhow::Result;
use dotenvy::dotenv;
use dropbox_oauth1::v0::{Client, Creds, MetadataOptions, TokenPair};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

// Builds a client, logging in with email/password when there is no cached
// token pair and saving the pair for the next run.
async fn authenticated_client() -> Result<Client> {
    let creds = Creds::from_env()?;
    if creds.token_pair().is_some() {
        return Ok(Client::new(creds));
    }

    let cache: PathBuf = std::env::var("DROPBOX_AUTH_CACHE")?.into();
    if let Ok(file) = File::open(&cache) {
        let pair: TokenPair = serde_json::from_reader(BufReader::new(file))?;
        let consumer_secret = std::env::var("DROPBOX_CONSUMER_SECRET").ok();
        return Ok(Client::new(Creds::from_tokens(
            creds.consumer_key(),
            consumer_secret.as_deref(),
            Some(&pair.token),
            Some(&pair.secret),
        )));
    }

    let client = Client::new(creds);
    let email = std::env::var("DROPBOX_EMAIL")?;
    let password = std::env::var("DROPBOX_PASSWORD")?;
    let pair = client.get_access_token(&email, &password).await?;
    serde_json::to_writer(BufWriter::new(File::create(&cache)?), &pair)?;
    println!("Saved access token pair to {}", cache.display());
    Ok(client)
}

// main
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let folder = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let client = authenticated_client().await?;

    let opts = MetadataOptions {
        list: Some(true),
        ..Default::default()
    };
    let listing = client.metadata(&folder, &opts).await?;
    let current_dir = if listing.is_root() { "root" } else { listing.path.as_str() };
    println!("Contents of {current_dir}:");
    for entry in &listing.contents {
        let marker = if entry.is_dir { "/" } else { "" };
        println!("  {}{}\t{}", entry.name(), marker, entry.size);
    }
    Ok(())
}
