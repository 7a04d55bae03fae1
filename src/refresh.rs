//! Periodic refresh with a single-flight guard: a tick that fires while the
//! previous fetch is still running is skipped instead of stacking requests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

#[derive(Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one fetch; dropping it frees the slot.
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Started,
    Skipped,
}

pub struct Refresher<F> {
    flight: SingleFlight,
    fetch: F,
}

impl<F, Fut> Refresher<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    pub fn new(fetch: F) -> Self {
        Self {
            flight: SingleFlight::new(),
            fetch,
        }
    }

    /// Starts a background fetch unless one is already outstanding.
    pub fn tick(&self) -> TickOutcome {
        let Some(guard) = self.flight.try_begin() else {
            tracing::warn!("previous refresh still in flight; skipping this tick");
            return TickOutcome::Skipped;
        };
        let fetch = (self.fetch)();
        tokio::spawn(async move {
            let _guard = guard;
            fetch.await;
        });
        TickOutcome::Started
    }

    pub fn in_flight(&self) -> bool {
        self.flight.is_busy()
    }

    /// Ticks every `period` until `stop` resolves. The first tick fires
    /// immediately.
    pub async fn run_until<S>(&self, period: Duration, stop: S)
    where
        S: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(stop);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick();
                }
                () = &mut stop => {
                    tracing::info!("refresh loop stopped");
                    break;
                }
            }
        }
    }
}
