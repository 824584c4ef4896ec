//! Bounded FIFO job queue drained by a fixed pool of worker threads,
//! spec.md §4.2 / §5.
//!
//! One mutex guards the queue; two condition variables arbitrate
//! producers (`not_full`) and consumers (`not_empty`), exactly as spec'd
//! — this is the one place the architecture pins a specific
//! synchronization primitive rather than leaving the choice to the
//! implementation, so it is not generalized to a lock-free queue the way
//! the teacher's pipeline stages are (see DESIGN.md).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    shutdown: Mutex<bool>,
}

/// A fixed-size pool of worker threads draining a shared bounded queue.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(worker_count: usize, capacity: usize) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            shutdown: Mutex::new(false),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let shared = shared.clone();
            workers.push(
                thread::Builder::new()
                    .name(format!("worker-{id}"))
                    .spawn(move || worker_loop(id, shared))
                    .expect("failed to spawn worker thread"),
            );
        }

        info!(worker_count, capacity, "worker pool started");
        Self { shared, workers }
    }

    /// Enqueue a job, blocking on `not_full` if the queue is saturated.
    /// Returns `Err(())` if shutdown has already been requested (the job
    /// is never run).
    pub fn submit<F>(&self, job: F) -> Result<(), ()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut queue = self.shared.queue.lock().unwrap();
        loop {
            if *self.shared.shutdown.lock().unwrap() {
                return Err(());
            }
            if queue.len() < self.shared.capacity {
                break;
            }
            queue = self.shared.not_full.wait(queue).unwrap();
        }
        queue.push_back(Box::new(job));
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Signal shutdown, wake every waiter, and join all worker threads.
    /// Queued jobs that have not yet started are discarded; an in-flight
    /// job runs to completion.
    pub fn shutdown(mut self) {
        *self.shared.shutdown.lock().unwrap() = true;
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        info!("worker pool shut down");
    }
}

fn worker_loop(id: usize, shared: Arc<Shared>) {
    loop {
        let job = {
            let mut queue = shared.queue.lock().unwrap();
            loop {
                if let Some(job) = queue.pop_front() {
                    shared.not_full.notify_one();
                    break Some(job);
                }
                if *shared.shutdown.lock().unwrap() {
                    break None;
                }
                queue = shared.not_empty.wait(queue).unwrap();
            }
        };

        match job {
            Some(job) => job(),
            None => break,
        }
    }
    debug!(worker = id, "worker thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn all_submitted_jobs_eventually_run() {
        let pool = WorkerPool::new(4, 16);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = counter.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn queue_capacity_is_respected_before_draining() {
        let pool = WorkerPool::new(1, 2);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            pool.submit(move || {
                std::thread::sleep(std::time::Duration::from_millis(1));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
