//! Concurrent fan-out of work items over a fixed pool of workers.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::thread;

use super::cancel::CancelToken;
use super::item::WorkItem;
use super::outcome::Outcome;
use super::pipeline::Processor;

/// Receives one call per finished item, from whichever worker finished it.
pub trait ProgressSink: Sync {
    fn item_done(&self, outcome: &Outcome);
}

/// A sink that ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn item_done(&self, _outcome: &Outcome) {}
}

/// Runs a [`Processor`] over many items at once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    workers: usize,
    cancel: CancelToken,
}

impl Dispatcher {
    /// A dispatcher with `workers` threads (at least one).
    pub fn new(workers: usize, cancel: CancelToken) -> Self {
        Self {
            workers: workers.max(1),
            cancel,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process every item and return their outcomes in input order.
    ///
    /// Once the cancel token trips, workers stop taking items and each item
    /// that was never started gets a cancelled outcome.
    pub fn run<P>(&self, items: Vec<WorkItem>, processor: &P, progress: &dyn ProgressSink) -> Vec<Outcome>
    where
        P: Processor + ?Sized,
    {
        let total = items.len();
        let queue: Mutex<VecDeque<usize>> = Mutex::new((0..total).collect());
        let slots: Mutex<Vec<Option<Outcome>>> = Mutex::new(vec![None; total]);
        let threads = self.workers.min(total);

        tracing::info!("Processing {} items using {} workers", total, threads);

        thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| loop {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    let Some(index) = lock(&queue).pop_front() else {
                        break;
                    };
                    let outcome = processor.process(&items[index]);
                    progress.item_done(&outcome);
                    lock(&slots)[index] = Some(outcome);
                });
            }
        });

        let slots = slots.into_inner().unwrap_or_else(|e| e.into_inner());
        let mut skipped = 0;
        let outcomes: Vec<Outcome> = slots
            .into_iter()
            .zip(items)
            .map(|(slot, item)| {
                slot.unwrap_or_else(|| {
                    skipped += 1;
                    Outcome::cancelled(item)
                })
            })
            .collect();

        if skipped > 0 {
            tracing::warn!("Run cancelled; {} of {} items were not processed", skipped, total);
        }
        tracing::info!("Finished processing {} items", total - skipped);
        outcomes
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
