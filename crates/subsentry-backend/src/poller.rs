//! Periodic alerts refresh.
//!
//! The scheduler owns a single timer task. Each tick spawns one fetch cycle
//! as its own task, so a restart of the schedule never interrupts a request
//! that is already on the wire.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest period the scheduler accepts.
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Everything a fetch cycle depends on. A change in any field restarts the
/// schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollInputs {
    /// Sign-in status captured when the schedule was armed.
    pub signed_in: bool,
    /// Identity of the credential accessor (its address).
    pub auth_identity: usize,
    /// Base URL of the alerts API.
    pub base_url: String,
}

/// Runs a fetch cycle immediately and then once per period.
#[derive(Debug)]
pub struct PollingScheduler {
    period: Duration,
    inputs: Option<PollInputs>,
    timer: Option<JoinHandle<()>>,
}

impl PollingScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            inputs: None,
            timer: None,
        }
    }

    /// Whether a timer is currently armed.
    pub fn is_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Inputs of the currently armed schedule, if any.
    pub fn inputs(&self) -> Option<&PollInputs> {
        self.inputs.as_ref()
    }

    /// Arm the schedule for `inputs`, replacing any previous timer.
    ///
    /// Returns `false` without touching the running timer when it was armed
    /// for identical inputs. Otherwise the old timer is cancelled before the
    /// new one is spawned, and the first cycle runs right away.
    pub fn reconfigure<F, Fut>(&mut self, inputs: PollInputs, cycle: F) -> bool
    where
        F: Fn(PollInputs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_armed() && self.inputs.as_ref() == Some(&inputs) {
            log::debug!("Polling inputs unchanged, keeping current timer");
            return false;
        }

        self.cancel();
        log::info!(
            "Arming alerts polling every {:?} (signed in: {}, base url: {})",
            self.period,
            inputs.signed_in,
            inputs.base_url
        );

        let period = self.period;
        let tick_inputs = inputs.clone();
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tokio::spawn(cycle(tick_inputs.clone()));
            }
        }));
        self.inputs = Some(inputs);
        true
    }

    /// Cancel the armed timer. Cycles already spawned run to completion.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            log::debug!("Polling timer cancelled");
        }
        self.inputs = None;
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    const PERIOD: Duration = Duration::from_secs(60);

    fn inputs(signed_in: bool, base_url: &str) -> PollInputs {
        PollInputs {
            signed_in,
            auth_identity: 1,
            base_url: base_url.to_string(),
        }
    }

    /// Records the inputs of every cycle that ran.
    fn recorder() -> (
        Arc<Mutex<Vec<PollInputs>>>,
        impl Fn(PollInputs) -> std::future::Ready<()> + Clone + Send + Sync + 'static,
    ) {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let sink = runs.clone();
        let cycle = move |inputs: PollInputs| {
            sink.lock().unwrap().push(inputs);
            std::future::ready(())
        };
        (runs, cycle)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_period() {
        let (runs, cycle) = recorder();
        let mut scheduler = PollingScheduler::new(PERIOD);
        assert!(scheduler.reconfigure(inputs(true, "http://a"), cycle));

        settle().await;
        assert_eq!(runs.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(runs.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(runs.lock().unwrap().len(), 2);

        tokio::time::sleep(PERIOD).await;
        settle().await;
        assert_eq!(runs.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_inputs_keep_timer() {
        let (runs, cycle) = recorder();
        let mut scheduler = PollingScheduler::new(PERIOD);
        assert!(scheduler.reconfigure(inputs(true, "http://a"), cycle));
        settle().await;

        let (other_runs, other_cycle) = recorder();
        assert!(!scheduler.reconfigure(inputs(true, "http://a"), other_cycle));
        settle().await;

        assert_eq!(runs.lock().unwrap().len(), 1);
        assert!(other_runs.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_inputs_replace_timer() {
        let (runs, cycle) = recorder();
        let mut scheduler = PollingScheduler::new(PERIOD);
        scheduler.reconfigure(inputs(true, "http://a"), cycle.clone());
        settle().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(scheduler.reconfigure(inputs(false, "http://a"), cycle));
        settle().await;

        {
            let runs = runs.lock().unwrap();
            assert_eq!(runs.len(), 2);
            assert!(!runs[1].signed_in);
        }

        // The first timer would have fired at t=60s; only the new one
        // (armed at t=10s) may fire, at t=70s.
        tokio::time::sleep(Duration::from_secs(55)).await;
        settle().await;
        assert_eq!(runs.lock().unwrap().len(), 2);

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        let runs = runs.lock().unwrap();
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().skip(1).all(|run| !run.signed_in));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (runs, cycle) = recorder();
        let mut scheduler = PollingScheduler::new(PERIOD);
        scheduler.reconfigure(inputs(true, "http://a"), cycle);
        settle().await;
        assert!(scheduler.is_armed());

        drop(scheduler);
        tokio::time::sleep(PERIOD * 3).await;
        settle().await;
        assert_eq!(runs.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_clears_inputs() {
        let (_runs, cycle) = recorder();
        let mut scheduler = PollingScheduler::new(PERIOD);
        scheduler.reconfigure(inputs(true, "http://a"), cycle);
        assert!(scheduler.inputs().is_some());

        scheduler.cancel();
        settle().await;
        assert!(!scheduler.is_armed());
        assert!(scheduler.inputs().is_none());
    }
}
