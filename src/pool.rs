//! A bounded-worker FIFO task queue with orderly shutdown.
//!
//! The classic `Mutex<VecDeque<Job>>` + `Condvar` thread-pool shape: workers block on
//! the condition variable while idle, tasks are handed out FIFO, and a task panicking
//! does not take the pool down with it.

use crate::types::Job;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

struct Queue {
    jobs: Mutex<VecDeque<Job>>,
    condvar: Condvar,
    shutting_down: Mutex<bool>,
}

/// A bounded pool of worker threads draining a single FIFO job queue.
pub struct WorkerPool {
    queue: Arc<Queue>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` threads. A `worker_count` of 0 is treated as 1.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let queue = Arc::new(Queue {
            jobs: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutting_down: Mutex::new(false),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let queue = queue.clone();
            workers.push(std::thread::spawn(move || worker_loop(queue)));
        }

        Self { queue, workers }
    }

    /// The number of worker threads this pool was built with.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Uses `std::thread::available_parallelism()` for the worker count, falling back
    /// to 1 if it cannot be determined.
    pub fn with_default_worker_count() -> Self {
        let count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(count)
    }

    /// Enqueues a task. Non-blocking from the caller's perspective; the queue is
    /// unbounded. Dropped silently if the pool is already shutting down.
    pub fn enqueue(&self, job: Job) {
        let mut jobs = self.queue.jobs.lock().expect("pool queue lock poisoned");
        if *self.queue.shutting_down.lock().expect("pool shutdown flag poisoned") {
            return;
        }
        jobs.push_back(job);
        self.queue.condvar.notify_one();
    }

    /// Stops accepting new work, wakes every idle worker, and joins all of them. Tasks
    /// already queued are drained first.
    pub fn shutdown(&mut self) {
        *self.queue.shutting_down.lock().expect("pool shutdown flag poisoned") = true;
        self.queue.condvar.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(queue: Arc<Queue>) {
    loop {
        let job = {
            let mut jobs = queue.jobs.lock().expect("pool queue lock poisoned");
            loop {
                if let Some(job) = jobs.pop_front() {
                    break Some(job);
                }
                if *queue.shutting_down.lock().expect("pool shutdown flag poisoned") {
                    break None;
                }
                jobs = queue.condvar.wait(jobs).expect("pool queue condvar poisoned");
            }
        };

        match job {
            Some(job) => {
                // A panicking task must not take the worker, or the pool, down with it.
                let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job));
            }
            None => break,
        }
    }
}
