//! §4.5 / §6.5 ActivityLog: `ActivitySink` atop `event-bus::InMemoryBus`,
//! mirroring `EventBus::publish`'s "no subscribers is not an error" semantics.

use std::sync::Arc;

use webagent_core_types::{ActivityEvent, ActivitySink};
use webagent_event_bus::{EventBus, InMemoryBus};

pub struct ActivityLog {
    bus: Arc<InMemoryBus<ActivityEvent>>,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            bus: InMemoryBus::new(capacity),
        })
    }

    pub fn bus(&self) -> Arc<InMemoryBus<ActivityEvent>> {
        self.bus.clone()
    }
}

impl ActivitySink for ActivityLog {
    fn emit(&self, event: ActivityEvent) {
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let _ = bus.publish(event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webagent_core_types::{ActivityId, ActivityRole, Severity};

    #[tokio::test]
    async fn emit_does_not_error_with_no_subscribers() {
        let log = ActivityLog::new(16);
        log.emit(ActivityEvent::new(
            ActivityId::new(),
            ActivityRole::Intent,
            Severity::Info,
            "hello",
        ));
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_events() {
        let log = ActivityLog::new(16);
        let mut rx = log.bus().subscribe();
        log.emit(ActivityEvent::new(
            ActivityId::new(),
            ActivityRole::Outcome,
            Severity::Info,
            "done",
        ));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.message, "done");
    }
}
