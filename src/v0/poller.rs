/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Change notifications built on top of the delta endpoint.
//!
//! [`ChangePoller`] keeps the delta cursor in memory and polls on a timer.
//! Subscribers receive a [`PollEvent`] per changed path, a `Reset` when the
//! server invalidated the cursor and an `Error` when a poll failed. Errors do
//! not stop the poller, the next tick simply tries again.

use crate::v0::errors::DropboxError;
use crate::v0::options::{CallOptions, DeltaOptions};
use crate::v0::{Client, DeltaEntry, DeltaPage};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300_000);
pub const DEFAULT_MAX_IMMEDIATE_POLLS: u32 = 16;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Wait between polls once the server has nothing more to report
    pub interval: Duration,
    /// Upper bound on back to back polls while the server reports `has_more`
    pub max_immediate_polls: u32,
    /// Credential overrides used for every delta call
    pub call: CallOptions,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_immediate_polls: DEFAULT_MAX_IMMEDIATE_POLLS,
            call: CallOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A path changed. `metadata` is None when it was deleted.
    Data(DeltaEntry),
    /// Everything learned from earlier events is stale
    Reset,
    Error(Arc<DropboxError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Running,
}

#[derive(Debug, Default)]
struct CursorState {
    cursor: Option<String>,
    // Set while the initial fetch is still draining `has_more` pages
    baseline_pending: bool,
}

#[derive(Debug)]
struct PollerInner {
    client: Client,
    config: PollerConfig,
    cursor: Mutex<CursorState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<PollEvent>>>,
}

#[derive(Debug)]
struct Session {
    running: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Polls the delta endpoint and fans changes out to subscribers
#[derive(Debug)]
pub struct ChangePoller {
    inner: Arc<PollerInner>,
    session: Mutex<Option<Session>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChangePoller {
    pub fn new(client: Client, config: PollerConfig) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                client,
                config,
                cursor: Mutex::new(CursorState::default()),
                subscribers: Mutex::new(Vec::new()),
            }),
            session: Mutex::new(None),
        }
    }

    /// Starts from a cursor saved earlier instead of a baseline fetch
    pub fn with_cursor(self, cursor: &str) -> Self {
        lock(&self.inner.cursor).cursor = Some(cursor.into());
        self
    }

    /// Receives every event emitted after this call
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<PollEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.subscribers).push(tx);
        rx
    }

    pub fn cursor(&self) -> Option<String> {
        lock(&self.inner.cursor).cursor.clone()
    }

    pub fn state(&self) -> PollState {
        match lock(&self.session).as_ref() {
            Some(session) if !session.task.is_finished() => PollState::Running,
            _ => PollState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollState::Running
    }

    /// Polls right away and then on every interval. Calling this while
    /// running restarts the timer.
    ///
    /// Fails with [`DropboxError::Config`] outside of a tokio runtime.
    pub fn start(&self) -> Result<(), DropboxError> {
        let runtime = Handle::try_current().map_err(|err| {
            DropboxError::Config(format!("the change poller needs a tokio runtime: {err}"))
        })?;
        let mut session = lock(&self.session);
        if let Some(old) = session.take() {
            let _ = old.running.send(false);
        }
        let (tx, rx) = watch::channel(true);
        let task = runtime.spawn(run(self.inner.clone(), rx));
        *session = Some(Session { running: tx, task });
        log::debug!("Change poller started");
        Ok(())
    }

    /// Stops the timer. A poll already in flight finishes but its result is
    /// dropped.
    pub fn stop(&self) {
        if let Some(session) = lock(&self.session).take() {
            let _ = session.running.send(false);
            log::debug!("Change poller stopped");
        }
    }

    pub fn resume(&self) -> Result<(), DropboxError> {
        self.start()
    }

    pub fn pause(&self) {
        self.stop()
    }

    /// Runs a single poll outside of the timer and dispatches its events.
    ///
    /// Returns whether the server has more changes ready.
    pub async fn poll_once(&self) -> Result<bool, DropboxError> {
        let (page, silent) = self.inner.fetch().await?;
        Ok(self.inner.apply(page, silent))
    }
}

impl Drop for ChangePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PollerInner {
    // Returns the page and whether it belongs to the silent baseline
    async fn fetch(&self) -> Result<(DeltaPage, bool), DropboxError> {
        let (cursor, silent) = {
            let state = lock(&self.cursor);
            let silent = state.cursor.is_none() || state.baseline_pending;
            (state.cursor.clone(), silent)
        };
        let opts = DeltaOptions {
            call: self.config.call.clone(),
            cursor,
        };
        let page = self.client.delta(&opts).await?;
        Ok((page, silent))
    }

    fn apply(&self, page: DeltaPage, silent: bool) -> bool {
        {
            let mut state = lock(&self.cursor);
            state.cursor = Some(page.cursor.clone());
            state.baseline_pending = silent && page.has_more;
        }
        if silent {
            log::debug!(
                "Baseline delta page with {} entries skipped",
                page.entries.len()
            );
            return page.has_more;
        }

        if page.reset {
            self.emit(PollEvent::Reset);
        }
        for entry in page.entries {
            self.emit(PollEvent::Data(entry));
        }
        page.has_more
    }

    fn emit(&self, event: PollEvent) {
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn emit_error(&self, err: DropboxError) {
        log::error!("Delta poll failed: {err}");
        self.emit(PollEvent::Error(Arc::new(err)));
    }
}

async fn run(inner: Arc<PollerInner>, mut running: watch::Receiver<bool>) {
    loop {
        let mut immediate = 0;
        loop {
            let outcome = inner.fetch().await;
            if !*running.borrow() {
                return;
            }
            match outcome {
                Ok((page, silent)) => {
                    if inner.apply(page, silent) {
                        if immediate < inner.config.max_immediate_polls {
                            immediate += 1;
                            continue;
                        }
                        log::warn!(
                            "Server still reports more changes after {immediate} immediate polls, waiting for the next tick"
                        );
                    }
                }
                Err(err) => inner.emit_error(err),
            }
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(inner.config.interval) => {}
            changed = running.changed() => {
                if changed.is_err() || !*running.borrow() {
                    return;
                }
            }
        }
    }
}
