//! Fixed-size worker pool for background work such as asset decoding.
//!
//! Workers drain one shared FIFO queue guarded by a mutex and condition
//! variable. Nothing here touches UI state: tasks must own their inputs, and
//! results come back through [`TaskHandle`] for the UI thread to pick up.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool has been shut down")]
    ShutDown,
    #[error("task panicked before producing a result")]
    TaskPanicked,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Default)]
struct Queue {
    tasks: VecDeque<Task>,
    /// Tasks currently executing on a worker
    running: usize,
    stopping: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    /// Signalled when a task is queued or the pool is stopping
    work: Condvar,
    /// Signalled when the queue drains and no task is running
    idle: Condvar,
}

/// Result of a submitted task.
pub struct TaskHandle<T> {
    result: Receiver<Result<T, PoolError>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes.
    pub fn wait(self) -> Result<T, PoolError> {
        self.result.recv().unwrap_or(Err(PoolError::ShutDown))
    }

    /// `None` if the task has not finished yet.
    pub fn try_take(&self) -> Option<Result<T, PoolError>> {
        match self.result.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PoolError::ShutDown)),
        }
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, PoolError>> {
        match self.result.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(PoolError::ShutDown)),
        }
    }
}

pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `threads` workers; zero means one per available core.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let threads = if threads == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            threads
        };
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue::default()),
            work: Condvar::new(),
            idle: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(threads),
        };
        for i in 0..threads {
            let shared = pool.shared.clone();
            let handle = std::thread::Builder::new()
                .name(format!("dockyard-worker-{}", i))
                .spawn(move || worker_loop(&shared))?;
            pool.workers.push(handle);
        }
        log::info!("worker pool started with {} threads", threads);
        Ok(pool)
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Tasks waiting to start.
    pub fn queued(&self) -> usize {
        self.shared.queue.lock().tasks.len()
    }

    fn push(&self, task: Task) -> Result<(), PoolError> {
        let mut queue = self.shared.queue.lock();
        if queue.stopping {
            return Err(PoolError::ShutDown);
        }
        queue.tasks.push_back(task);
        drop(queue);
        self.shared.work.notify_one();
        Ok(())
    }

    /// Queue `f` and get a handle to its result.
    pub fn submit<T, F>(&self, f: F) -> Result<TaskHandle<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.push(Box::new(move || {
            let result = catch_unwind(AssertUnwindSafe(f)).map_err(|_| PoolError::TaskPanicked);
            // The handle may already be gone; nobody is waiting then.
            let _ = tx.send(result);
        }))?;
        Ok(TaskHandle { result: rx })
    }

    /// Queue `f` without a way to observe its result.
    pub fn enqueue<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Box::new(f))
    }

    /// Block until the queue is empty and no task is running.
    pub fn wait_idle(&self) {
        let mut queue = self.shared.queue.lock();
        while !queue.tasks.is_empty() || queue.running > 0 {
            self.shared.idle.wait(&mut queue);
        }
    }

    /// Let workers finish the queued tasks, then join them.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shared.queue.lock().stopping = true;
        self.shared.work.notify_all();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("worker thread exited abnormally");
            }
        }
        log::info!("worker pool shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.queue.lock().stopping
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .finish_non_exhaustive()
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(task) = queue.tasks.pop_front() {
                    queue.running += 1;
                    break task;
                }
                if queue.stopping {
                    return;
                }
                shared.work.wait(&mut queue);
            }
        };

        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            log::error!("pool task panicked");
        }

        let mut queue = shared.queue.lock();
        queue.running -= 1;
        if queue.tasks.is_empty() && queue.running == 0 {
            shared.idle.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_submit_returns_result() {
        let pool = WorkerPool::new(2).unwrap();
        let handle = pool.submit(|| 6 * 7).unwrap();
        assert_eq!(handle.wait().unwrap(), 42);
    }

    #[test]
    fn test_wait_idle_sees_every_task() {
        let pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = counter.clone();
            pool.enqueue(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.wait_idle();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert_eq!(pool.queued(), 0);
    }

    #[test]
    fn test_panicking_task_is_reported() {
        let pool = WorkerPool::new(1).unwrap();
        let handle = pool.submit(|| -> u32 { panic!("boom") }).unwrap();
        assert!(matches!(handle.wait(), Err(PoolError::TaskPanicked)));
        // The worker survives.
        assert_eq!(pool.submit(|| 1).unwrap().wait().unwrap(), 1);
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();
        assert!(pool.is_shut_down());
        assert!(matches!(pool.submit(|| ()), Err(PoolError::ShutDown)));
        assert!(matches!(pool.enqueue(|| ()), Err(PoolError::ShutDown)));
    }

    #[test]
    fn test_shutdown_drains_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(1).unwrap();
            for _ in 0..10 {
                let counter = counter.clone();
                pool.enqueue(move || {
                    std::thread::sleep(Duration::from_millis(1));
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
