//! Cancellable periodic task.
//!
//! A [`PeriodicTask`] runs [`Tick::tick`] to completion, then waits one
//! interval on its [`Clock`], forever, until the [`TaskHandle`] is stopped.
//! Ticks never overlap and the wait is the same whatever the tick did.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

/// Unit of periodic work
#[async_trait]
pub trait Tick: Send + 'static {
    async fn tick(&mut self);
}

/// Source of delays between ticks
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    async fn sleep(&self, period: Duration);
}

/// Wall-clock delays via the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

pub struct PeriodicTask<C> {
    interval: Duration,
    clock: C,
}

impl<C: Clock> PeriodicTask<C> {
    pub fn new(interval: Duration, clock: C) -> Self {
        Self { interval, clock }
    }

    /// Spawns the loop on the tokio runtime
    pub fn start<T: Tick>(self, mut task: T) -> TaskHandle<T> {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let Self { interval, clock } = self;

        let join = tokio::spawn(async move {
            let mut ticks: u64 = 0;
            loop {
                if *stop_rx.borrow() {
                    break;
                }

                task.tick().await;
                ticks += 1;

                tokio::select! {
                    _ = clock.sleep(interval) => {}
                    _ = stop_rx.changed() => break,
                }
            }
            ::log::debug!("Periodic task stopped after {} ticks", ticks);
            task
        });

        TaskHandle { stop_tx, join }
    }
}

/// Control over a started [`PeriodicTask`]
///
/// Awaiting the handle resolves only when the loop ends without being asked
/// to, i.e. when a tick panicked.
pub struct TaskHandle<T> {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// Stops the loop and hands the task back
    ///
    /// A tick in progress runs to completion first; a pending delay is cut
    /// short.
    pub async fn stop(self) -> Result<T, JoinError> {
        // The receiver is gone only if the loop already ended.
        let _ = self.stop_tx.send(true);
        self.join.await
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.join).poll(cx)
    }
}
