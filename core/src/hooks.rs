//! Model-load re-evaluation
//!
//! The engine rebuilds a character's model on load, wiping applied textures
//! and morphs. [`ModelLoadScheduler`] delays re-application until the model
//! has settled: every load spawns a timer task, and the form id comes out of
//! the scheduler once the delay has passed. The host's main loop drains ready
//! ids and calls [`Distribution::apply_profiles`](crate::distribution::Distribution::apply_profiles).
//!
//! Duplicate deliveries are harmless since selections are cached.

use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use dynbody_types::AppConfig;

use crate::actor::FormId;

const CHANNEL_CAPACITY: usize = 256;

pub struct ModelLoadScheduler {
    delay: Duration,
    tx: Sender<FormId>,
    rx: Receiver<FormId>,
}

impl ModelLoadScheduler {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self { delay, tx, rx }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_millis(config.apply_delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue `form_id` for re-application after the delay.
    ///
    /// Needs a running tokio runtime; without one the load is dropped and
    /// `None` is returned.
    pub fn on_model_loaded(&self, form_id: FormId) -> Option<JoinHandle<()>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(actor = form_id, error = %e, "No runtime for model-load timer");
                return None;
            }
        };

        let tx = self.tx.clone();
        let delay = self.delay;
        tracing::trace!(actor = form_id, ?delay, "Model loaded, scheduling re-apply");
        Some(handle.spawn(async move {
            sleep(delay).await;
            if tx.send(form_id).await.is_err() {
                tracing::debug!(actor = form_id, "Scheduler dropped before delivery");
            }
        }))
    }

    /// Wait for the next ready form id.
    pub async fn next_ready(&mut self) -> Option<FormId> {
        self.rx.recv().await
    }

    /// Every form id whose delay has already passed.
    pub fn drain_ready(&mut self) -> Vec<FormId> {
        let mut ready = Vec::new();
        while let Ok(form_id) = self.rx.try_recv() {
            ready.push(form_id);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_after_delay() {
        let mut scheduler = ModelLoadScheduler::new(Duration::from_millis(20));
        let task = scheduler.on_model_loaded(0x14).unwrap();
        assert!(scheduler.drain_ready().is_empty());

        task.await.unwrap();
        assert_eq!(scheduler.drain_ready(), vec![0x14]);
        assert!(scheduler.drain_ready().is_empty());
    }

    #[tokio::test]
    async fn next_ready_waits_for_timer() {
        let mut scheduler = ModelLoadScheduler::new(Duration::from_millis(5));
        scheduler.on_model_loaded(0x20).unwrap();
        scheduler.on_model_loaded(0x20).unwrap();
        assert_eq!(scheduler.next_ready().await, Some(0x20));
        assert_eq!(scheduler.next_ready().await, Some(0x20));
    }

    #[test]
    fn without_runtime_loads_are_dropped() {
        let scheduler = ModelLoadScheduler::new(Duration::from_millis(5));
        assert!(scheduler.on_model_loaded(0x14).is_none());
    }

    #[test]
    fn delay_comes_from_config() {
        let mut config = AppConfig::default();
        config.apply_delay_ms = 750;
        assert_eq!(
            ModelLoadScheduler::from_config(&config).delay(),
            Duration::from_millis(750)
        );
    }
}
