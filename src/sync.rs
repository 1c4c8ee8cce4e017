use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Fan-out channel modelling same-origin storage events: every committed
/// write of the persisted document is announced to every OTHER subscriber.
/// The writing tab never hears its own write, matching the browser behavior
/// the original relied on.
///
/// Delivery is fire-and-forget and carries the full serialized document;
/// receivers replace their state wholesale (last writer wins).
pub struct ChangeBus {
    subscribers: Mutex<Vec<(u64, Sender<String>)>>,
    next_id: Mutex<u64>,
}

/// One tab's end of the bus. Disconnected receivers are pruned lazily on the
/// next publish.
pub struct BusSubscription {
    id: u64,
    receiver: Receiver<String>,
}

impl BusSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Drain all pending notifications and keep only the newest payload.
    /// Intermediate states are dead the moment a later write lands, so there
    /// is no point replaying them.
    pub fn latest(&self) -> Option<String> {
        let mut newest = None;
        while let Ok(payload) = self.receiver.try_recv() {
            newest = Some(payload);
        }
        newest
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        ChangeBus {
            subscribers: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> BusSubscription {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let (sender, receiver) = channel();
        self.subscribers.lock().unwrap().push((id, sender));
        BusSubscription { id, receiver }
    }

    /// Announce a committed write to every subscriber except the sender.
    pub fn publish(&self, sender_id: u64, payload: &str) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|(id, sender)| {
            if *id == sender_id {
                return true;
            }
            sender.send(payload.to_string()).is_ok()
        });
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        ChangeBus::new()
    }
}
