use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};

use super::ExecutionContext;
use crate::error::{Error, Result};

type Task = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Completion resolves once a dispatched task has finished on its target context.
pub struct Completion<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Completion<T> {
    /// wait for the task output. Fails if the target thread shut down before
    /// the task produced a value.
    pub async fn wait(self) -> Result<T> {
        self.rx.await.map_err(|_| Error::ErrContextThreadShutdown)
    }
}

/// ContextThread is a named OS thread driving a single-threaded tokio runtime.
/// Tasks dispatched to it start in FIFO order and may run concurrently with
/// one another, but always on this thread.
pub struct ContextThread {
    context: ExecutionContext,
    name: String,
    tx: Mutex<Option<mpsc::UnboundedSender<Task>>>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ContextThread {
    /// spawn starts the thread and marks it with the given context.
    pub fn spawn(context: ExecutionContext, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .thread_name(name.clone())
            .build()?;

        let join_handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                context.enter();
                rt.block_on(async move {
                    while let Some(task) = rx.recv().await {
                        tokio::spawn(task());
                    }
                });
            })?;

        log::debug!("started {context} context thread {name}");

        Ok(ContextThread {
            context,
            name,
            tx: Mutex::new(Some(tx)),
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// dispatch sends `f` to this thread without blocking the caller. The
    /// returned completion carries the output of the future `f` produces.
    pub fn dispatch<F, Fut, T>(&self, f: F) -> Result<Completion<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let task: Task = Box::new(move || {
            Box::pin(async move {
                let out = f().await;
                let _ = done_tx.send(out);
            })
        });

        let tx = self
            .tx
            .lock()
            .map_err(|_| Error::ErrContextThreadShutdown)?;
        match &*tx {
            Some(tx) => tx.send(task).map_err(|_| Error::ErrContextThreadShutdown)?,
            None => return Err(Error::ErrContextThreadShutdown),
        }

        Ok(Completion { rx: done_rx })
    }

    /// is_shutdown reports whether the thread stopped accepting tasks.
    pub fn is_shutdown(&self) -> bool {
        match self.tx.lock() {
            Ok(tx) => tx.as_ref().map(|tx| tx.is_closed()).unwrap_or(true),
            Err(_) => true,
        }
    }

    /// shutdown stops accepting tasks, lets the runtime drop pending ones and
    /// joins the thread. Calling it from the thread itself only closes the queue.
    pub fn shutdown(&self) {
        if let Ok(mut tx) = self.tx.lock() {
            tx.take();
        }

        let join_handle = match self.join_handle.lock() {
            Ok(mut h) => h.take(),
            Err(_) => None,
        };

        if let Some(join_handle) = join_handle {
            if join_handle.thread().id() == std::thread::current().id() {
                return;
            }
            if join_handle.join().is_err() {
                log::warn!("{} context thread {} panicked", self.context, self.name);
            } else {
                log::debug!("stopped {} context thread {}", self.context, self.name);
            }
        }
    }
}

impl Drop for ContextThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
