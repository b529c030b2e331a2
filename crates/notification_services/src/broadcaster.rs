use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

use crate::types::LiveEvent;

struct Session {
    sender: UnboundedSender<LiveEvent>,
    channels: HashSet<String>,
}

/// In-process registry of live sessions and their channel subscriptions.
///
/// Handlers publish into named channels (one per role, one per user id) and
/// every subscribed session receives a copy. Sessions whose receiver has
/// gone away are pruned on the next publish that reaches them. Shared
/// behind an `Arc` and injected wherever events are emitted.
#[derive(Default)]
pub struct LiveBroadcaster {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl LiveBroadcaster {
    /// Creates an empty broadcaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session and returns the receiving half of its
    /// event channel. The session starts with no subscriptions.
    pub fn connect(&self, session_id: Uuid) -> UnboundedReceiver<LiveEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut sessions = self.sessions.lock().expect("broadcaster lock poisoned");
        sessions.insert(
            session_id,
            Session {
                sender,
                channels: HashSet::new(),
            },
        );
        debug!("Live session {} connected", session_id);
        receiver
    }

    /// Subscribes a session to a channel. Unknown sessions are ignored.
    pub fn subscribe(&self, session_id: &Uuid, channel: &str) {
        let mut sessions = self.sessions.lock().expect("broadcaster lock poisoned");
        if let Some(session) = sessions.get_mut(session_id) {
            session.channels.insert(channel.to_string());
        }
    }

    /// Delivers an event to every session subscribed to `channel`,
    /// pruning sessions whose receiver has been dropped.
    pub fn publish(&self, channel: &str, event: &LiveEvent) {
        let mut sessions = self.sessions.lock().expect("broadcaster lock poisoned");
        let mut dead = Vec::new();

        for (session_id, session) in sessions.iter() {
            if !session.channels.contains(channel) {
                continue;
            }
            if session.sender.send(event.clone()).is_err() {
                dead.push(*session_id);
            }
        }

        for session_id in dead {
            sessions.remove(&session_id);
            debug!("Pruned dead live session {}", session_id);
        }
    }

    /// Removes a session. Safe to call for sessions already pruned.
    pub fn disconnect(&self, session_id: &Uuid) {
        let mut sessions = self.sessions.lock().expect("broadcaster lock poisoned");
        sessions.remove(session_id);
        debug!("Live session {} disconnected", session_id);
    }

    /// Count of currently registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("broadcaster lock poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> LiveEvent {
        LiveEvent::new(name, serde_json::json!({"ok": true}))
    }

    #[test]
    fn events_reach_only_subscribed_channels() {
        let broadcaster = LiveBroadcaster::new();
        let admin_id = Uuid::new_v4();
        let customer_id = Uuid::new_v4();

        let mut admin_rx = broadcaster.connect(admin_id);
        let mut customer_rx = broadcaster.connect(customer_id);
        broadcaster.subscribe(&admin_id, "admin");
        broadcaster.subscribe(&customer_id, "customer");

        broadcaster.publish("admin", &event("new-booking"));

        assert_eq!(admin_rx.try_recv().unwrap().event, "new-booking");
        assert!(customer_rx.try_recv().is_err());
    }

    #[test]
    fn a_session_can_listen_on_multiple_channels() {
        let broadcaster = LiveBroadcaster::new();
        let session_id = Uuid::new_v4();

        let mut rx = broadcaster.connect(session_id);
        broadcaster.subscribe(&session_id, "customer");
        broadcaster.subscribe(&session_id, &session_id.to_string());

        broadcaster.publish(&session_id.to_string(), &event("booking-updated"));
        broadcaster.publish("customer", &event("announcement"));

        assert_eq!(rx.try_recv().unwrap().event, "booking-updated");
        assert_eq!(rx.try_recv().unwrap().event, "announcement");
    }

    #[test]
    fn dropped_receivers_are_pruned_on_publish() {
        let broadcaster = LiveBroadcaster::new();
        let session_id = Uuid::new_v4();

        let rx = broadcaster.connect(session_id);
        broadcaster.subscribe(&session_id, "admin");
        drop(rx);

        assert_eq!(broadcaster.session_count(), 1);
        broadcaster.publish("admin", &event("new-booking"));
        assert_eq!(broadcaster.session_count(), 0);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let broadcaster = LiveBroadcaster::new();
        let session_id = Uuid::new_v4();

        let _rx = broadcaster.connect(session_id);
        broadcaster.disconnect(&session_id);
        broadcaster.disconnect(&session_id);
        assert_eq!(broadcaster.session_count(), 0);
    }
}
