//! Debounced writes.
//!
//! One worker thread per manager holds at most one pending write per key.
//! Scheduling a key again replaces its data and pushes its deadline back, so
//! a burst of writes collapses into the last one.

use std::collections::HashMap;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use serde_json::Value;

use super::SaveOptions;

/// Data captured at schedule time, written when the key goes quiet.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub data: Value,
    pub options: SaveOptions,
}

enum Command {
    Schedule {
        key: String,
        write: PendingWrite,
        due: Instant,
    },
    Flush(Sender<()>),
    /// Drop the pending write for one key, or for every key on `None`.
    Cancel(Option<String>, Sender<()>),
    Shutdown,
}

pub struct Debouncer {
    tx: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer").finish_non_exhaustive()
    }
}

impl Debouncer {
    /// Start the worker; `sink` performs the actual write.
    pub fn spawn<F>(sink: F) -> Self
    where
        F: Fn(&str, PendingWrite) + Send + 'static,
    {
        let (tx, rx) = unbounded();
        let handle = std::thread::Builder::new()
            .name("glab-debounce".to_string())
            .spawn(move || run_worker(&rx, &sink))
            .map_err(|err| tracing::error!(error = %err, "failed to start debounce worker"))
            .ok();
        Self { tx, handle }
    }

    /// Queue `write` for `key`, superseding any pending write for it.
    ///
    /// Falls back to writing nothing if the worker is gone; callers treat
    /// debounced saves as best effort.
    pub fn schedule(&self, key: &str, write: PendingWrite, delay: Duration) {
        let command = Command::Schedule {
            key: key.to_string(),
            write,
            due: Instant::now() + delay,
        };
        if self.tx.send(command).is_err() {
            tracing::warn!(key, "debounce worker stopped; dropping pending write");
        }
    }

    /// Write everything pending now and wait until it is done.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Discard the pending write for `key` without writing it.
    pub fn cancel(&self, key: &str) {
        self.send_cancel(Some(key.to_string()));
    }

    /// Discard every pending write.
    pub fn cancel_all(&self) {
        self.send_cancel(None);
    }

    fn send_cancel(&self, key: Option<String>) {
        let (ack_tx, ack_rx) = bounded(1);
        if self.tx.send(Command::Cancel(key, ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_worker<F>(rx: &Receiver<Command>, sink: &F)
where
    F: Fn(&str, PendingWrite),
{
    let mut pending: HashMap<String, (PendingWrite, Instant)> = HashMap::new();

    loop {
        let next_due = pending.values().map(|(_, due)| *due).min();
        let received = match next_due {
            Some(due) => rx.recv_deadline(due),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Command::Schedule { key, write, due }) => {
                pending.insert(key, (write, due));
            }
            Ok(Command::Flush(ack)) => {
                drain(&mut pending, sink, None);
                let _ = ack.send(());
            }
            Ok(Command::Cancel(key, ack)) => {
                match key {
                    Some(key) => {
                        pending.remove(&key);
                    }
                    None => pending.clear(),
                }
                let _ = ack.send(());
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                drain(&mut pending, sink, None);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                drain(&mut pending, sink, Some(Instant::now()));
            }
        }
    }
}

/// Write entries due by `cutoff` (all of them when `cutoff` is `None`), oldest deadline first.
fn drain<F>(pending: &mut HashMap<String, (PendingWrite, Instant)>, sink: &F, cutoff: Option<Instant>)
where
    F: Fn(&str, PendingWrite),
{
    let mut ready: Vec<String> = pending
        .iter()
        .filter(|(_, (_, due))| cutoff.is_none_or(|cutoff| *due <= cutoff))
        .map(|(key, _)| key.clone())
        .collect();
    ready.sort_by_key(|key| pending[key].1);

    for key in ready {
        if let Some((write, _)) = pending.remove(&key) {
            sink(&key, write);
        }
    }
}
