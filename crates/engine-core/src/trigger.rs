use connectors::trigger::UpdateTrigger;
use tracing::{info, warn};

/// Hands flagged identifiers to an [`UpdateTrigger`] for the span of one pass.
///
/// Every flagged pair is notified, so an identifier that drifts on both sides
/// is sent twice. Only counters are kept. Failed notifications are logged and
/// counted; they never abort the pass.
pub struct TriggerDispatcher<T> {
    trigger: T,
    notified: u64,
    failures: u64,
}

impl<T: UpdateTrigger> TriggerDispatcher<T> {
    pub fn new(trigger: T) -> Self {
        Self {
            trigger,
            notified: 0,
            failures: 0,
        }
    }

    /// Calls the trigger for `id`. Returns `false` when it reported a failure.
    pub async fn dispatch(&mut self, id: &str) -> bool {
        self.notified += 1;
        match self.trigger.notify(id).await {
            Ok(()) => {
                info!("{id}");
                true
            }
            Err(err) => {
                self.failures += 1;
                warn!(pid = id, error = %err, "Failed to update");
                false
            }
        }
    }

    /// Whether the trigger has been called at all, successfully or not.
    pub fn invoked(&self) -> bool {
        self.notified > 0
    }

    pub fn notified(&self) -> u64 {
        self.notified
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn into_inner(self) -> T {
        self.trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::error::TriggerError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        reject: Option<&'static str>,
    }

    #[async_trait]
    impl UpdateTrigger for Recorder {
        async fn notify(&self, id: &str) -> Result<(), TriggerError> {
            self.calls.lock().unwrap().push(id.to_string());
            if self.reject == Some(id) {
                return Err(TriggerError::Status {
                    id: id.to_string(),
                    status: 500,
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn nothing_dispatched_means_not_invoked() {
        let dispatcher = TriggerDispatcher::new(Recorder::default());
        assert!(!dispatcher.invoked());
        assert_eq!(dispatcher.notified(), 0);
    }

    #[tokio::test]
    async fn notifies_every_flag_including_repeats() {
        let mut dispatcher = TriggerDispatcher::new(Recorder::default());

        assert!(dispatcher.dispatch("a:1").await);
        assert!(dispatcher.dispatch("a:2").await);
        assert!(dispatcher.dispatch("a:1").await);

        assert!(dispatcher.invoked());
        assert_eq!(dispatcher.notified(), 3);

        let recorder = dispatcher.into_inner();
        assert_eq!(*recorder.calls.lock().unwrap(), vec!["a:1", "a:2", "a:1"]);
    }

    #[tokio::test]
    async fn failures_are_counted_and_still_invoke() {
        let recorder = Recorder {
            reject: Some("bad:1"),
            ..Recorder::default()
        };
        let mut dispatcher = TriggerDispatcher::new(recorder);

        assert!(!dispatcher.dispatch("bad:1").await);
        assert!(dispatcher.dispatch("ok:1").await);

        assert!(dispatcher.invoked());
        assert_eq!(dispatcher.failures(), 1);
        assert_eq!(dispatcher.notified(), 2);
    }
}
