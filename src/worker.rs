use crate::model::IndexStats;
use crate::query::LaravelIndex;
use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use tracing::{debug, warn};

type Reply = Sender<Result<IndexStats, String>>;

enum Request {
    Refresh(Option<Reply>),
    Stop,
}

/// Runs refreshes on one background thread. Requests that queue up while a
/// refresh is running are folded into the next one.
pub struct RefreshWorker {
    tx: Sender<Request>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RefreshWorker {
    pub fn start(index: Arc<LaravelIndex>) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread = thread::spawn(move || run_loop(&index, rx));
        Self {
            tx,
            thread: Some(thread),
        }
    }

    /// Queues a refresh and returns immediately.
    pub fn request(&self) {
        if self.tx.send(Request::Refresh(None)).is_err() {
            warn!("refresh worker is gone");
        }
    }

    /// Queues a refresh and waits for the one that covers it.
    pub fn refresh(&self) -> Result<IndexStats> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Request::Refresh(Some(reply_tx)))
            .map_err(|_| anyhow!("refresh worker is gone"))?;
        reply_rx
            .recv()
            .map_err(|_| anyhow!("refresh worker stopped before replying"))?
            .map_err(|err| anyhow!(err))
    }

    pub fn stop(mut self) {
        let _ = self.tx.send(Request::Stop);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(Request::Stop);
    }
}

fn run_loop(index: &LaravelIndex, rx: Receiver<Request>) {
    while let Ok(request) = rx.recv() {
        let mut waiters = Vec::new();
        match request {
            Request::Refresh(reply) => waiters.extend(reply),
            Request::Stop => return,
        }
        let mut stop = false;
        loop {
            match rx.try_recv() {
                Ok(Request::Refresh(reply)) => waiters.extend(reply),
                Ok(Request::Stop) | Err(TryRecvError::Disconnected) => {
                    stop = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        debug!("refresh covering {} waiters", waiters.len());
        let outcome = index.refresh().map_err(|err| format!("{err:#}"));
        if let Err(err) = &outcome {
            warn!("refresh failed: {err}");
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
        if stop {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexOptions;
    use crate::source::MemorySourceTree;

    #[test]
    fn refresh_publishes_stats() {
        let tree = MemorySourceTree::new()
            .with_file("routes/web.php", "<?php Route::get('/', fn () => 1)->name('home');");
        let index = Arc::new(LaravelIndex::new(Arc::new(tree), IndexOptions::default()).unwrap());
        let worker = RefreshWorker::start(Arc::clone(&index));
        worker.request();
        let stats = worker.refresh().unwrap();
        assert_eq!(stats.routes, 1);
        assert!(index.is_indexed());
        worker.stop();
    }
}
