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
use dropbox_oauth1::v0::{ChangePoller, Client, Creds, PollEvent, PollerConfig};
use std::time::Duration;

// Prints every change reported for the account until interrupted.
// Expects DROPBOX_ACCESS_TOKEN/DROPBOX_ACCESS_TOKEN_SECRET to be set.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let interval_secs = std::env::var("DROPBOX_POLL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);

    let client = Client::new(Creds::from_env()?);
    let poller = ChangePoller::new(
        client,
        PollerConfig {
            interval: Duration::from_secs(interval_secs),
            ..Default::default()
        },
    );
    let mut events = poller.subscribe();
    poller.start()?;
    println!("Watching for changes every {interval_secs}s");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(PollEvent::Data(entry)) => match entry.metadata {
                    Some(meta) => println!("updated: {meta}"),
                    None => println!("deleted: {}", entry.path),
                },
                Some(PollEvent::Reset) => println!("reset, rescanning"),
                Some(PollEvent::Error(err)) => eprintln!("poll failed: {err}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    println!("cursor at exit: {:?}", poller.cursor());
    Ok(())
}
