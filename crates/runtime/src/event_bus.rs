use std::collections::VecDeque;

use foundation::math::LatLon;
use tracing::debug;

/// Pointer interactions a host map reports to its subscribers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Click,
    DoubleClick,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseOut,
    ContextMenu,
}

impl InteractionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Click => "click",
            InteractionKind::DoubleClick => "dblclick",
            InteractionKind::MouseDown => "mousedown",
            InteractionKind::MouseUp => "mouseup",
            InteractionKind::MouseMove => "mousemove",
            InteractionKind::MouseOver => "mouseover",
            InteractionKind::MouseOut => "mouseout",
            InteractionKind::ContextMenu => "contextmenu",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub coordinates: LatLon,
}

impl Interaction {
    pub fn click(coordinates: LatLon) -> Self {
        Self {
            kind: InteractionKind::Click,
            coordinates,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(pub u64);

/// Minimal event record for traceability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub sequence: u64,
    pub kind: &'static str,
    pub message: String,
}

/// Events kept by a bus built with `new`.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Subscriber set for map interactions plus a bounded event log.
///
/// Ordering contract:
/// - `dispatch` reports subscribers in subscription order.
/// - Ids are never reused, so a stale id cannot unsubscribe a newer subscriber.
/// - Once the log holds `event_capacity` events, the oldest is dropped for each new one.
///   Sequence numbers keep counting, so gaps show what was dropped.
#[derive(Debug)]
pub struct InteractionBus {
    next_id: u64,
    sequence: u64,
    subscribers: Vec<SubscriberId>,
    events: VecDeque<Event>,
    event_capacity: usize,
}

impl Default for InteractionBus {
    fn default() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl InteractionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero keeps no events.
    pub fn with_event_capacity(event_capacity: usize) -> Self {
        Self {
            next_id: 0,
            sequence: 0,
            subscribers: Vec::new(),
            events: VecDeque::with_capacity(event_capacity.min(DEFAULT_EVENT_CAPACITY)),
            event_capacity,
        }
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(id);
        self.emit("subscribe", format!("subscriber {}", id.0));
        id
    }

    /// Returns `true` if `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let Some(pos) = self.subscribers.iter().position(|s| *s == id) else {
            return false;
        };
        self.subscribers.remove(pos);
        self.emit("unsubscribe", format!("subscriber {}", id.0));
        true
    }

    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.subscribers.contains(&id)
    }

    pub fn subscribers(&self) -> &[SubscriberId] {
        &self.subscribers
    }

    /// Records `interaction` and returns the subscribers it must be delivered to.
    pub fn dispatch(&mut self, interaction: Interaction) -> Vec<SubscriberId> {
        let c = interaction.coordinates;
        self.emit(
            interaction.kind.as_str(),
            format!("lat={} lon={} subscribers={}", c.lat, c.lon, self.subscribers.len()),
        );
        self.subscribers.clone()
    }

    pub fn emit(&mut self, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        debug!(sequence = self.sequence, kind, %message, "map interaction event");
        if self.event_capacity > 0 {
            if self.events.len() == self.event_capacity {
                self.events.pop_front();
            }
            self.events.push_back(Event {
                sequence: self.sequence,
                kind,
                message,
            });
        }
        self.sequence += 1;
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> impl DoubleEndedIterator<Item = &Event> + '_ {
        self.events.iter()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
