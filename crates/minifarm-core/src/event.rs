//! Change notifications for presentation-layer subscribers.
//!
//! Mutations emit typed events into per-kind ring buffers; the
//! orchestrator flushes them with [`EventBus::deliver`] before each
//! public operation returns. Subscribers are passive renderers: they
//! observe state, they never mutate it.
//!
//! Catch-up produces the same notifications as live ticking, but cycle
//! completions are aggregated into one [`Event::CycleCompleted`] per
//! operation -- a three-day offline gap must not flood subscribers with
//! fifty thousand events.

use crate::factory::StopReason;
use crate::id::{FactoryId, ResourceName};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The ledger changed. Carries a detached copy of the full ledger,
    /// never a live view -- subscribers may hold it across later
    /// mutations.
    ResourcesChanged {
        resources: BTreeMap<ResourceName, u32>,
    },
    StockChanged {
        factory: FactoryId,
        stock: u32,
    },
    QueueChanged {
        factory: FactoryId,
        queue: u32,
    },
    ProductionStarted {
        factory: FactoryId,
    },
    ProductionStopped {
        factory: FactoryId,
        reason: StopReason,
    },
    /// One or more cycles landed during a single advance/catch-up.
    CycleCompleted {
        factory: FactoryId,
        cycles: u64,
        produced: u32,
    },
    ItemsCollected {
        factory: FactoryId,
        quantity: u32,
    },
    FactoryCreated {
        factory: FactoryId,
    },
}

/// Discriminant tag for event types, used for suppression and
/// subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ResourcesChanged,
    StockChanged,
    QueueChanged,
    ProductionStarted,
    ProductionStopped,
    CycleCompleted,
    ItemsCollected,
    FactoryCreated,
}

const EVENT_KIND_COUNT: usize = 8;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ResourcesChanged { .. } => EventKind::ResourcesChanged,
            Event::StockChanged { .. } => EventKind::StockChanged,
            Event::QueueChanged { .. } => EventKind::QueueChanged,
            Event::ProductionStarted { .. } => EventKind::ProductionStarted,
            Event::ProductionStopped { .. } => EventKind::ProductionStopped,
            Event::CycleCompleted { .. } => EventKind::CycleCompleted,
            Event::ItemsCollected { .. } => EventKind::ItemsCollected,
            Event::FactoryCreated { .. } => EventKind::FactoryCreated,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// Fixed-capacity ring buffer; when full, the oldest events are dropped.
#[derive(Debug)]
struct EventBuffer {
    events: Vec<Option<Event>>,
    head: usize,
    len: usize,
}

impl EventBuffer {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, event: Event) {
        let capacity = self.events.len();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
    }

    /// Drain events oldest-to-newest, leaving the buffer empty.
    fn drain_in_order(&mut self) -> Vec<Event> {
        let capacity = self.events.len();
        let start = if self.len < capacity {
            0
        } else {
            // head is the next write slot, i.e. the oldest entry.
            self.head
        };
        let mut out = Vec::with_capacity(self.len);
        for i in 0..self.len {
            if let Some(event) = self.events[(start + i) % capacity].take() {
                out.push(event);
            }
        }
        self.head = 0;
        self.len = 0;
        out
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A passive subscriber. Called once per delivered event, in emission
/// order.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// Per-kind ring buffers plus subscriber lists. Suppressed kinds cost
/// nothing: no allocation, no buffering, no delivery.
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    subscribers: [Vec<PassiveListener>; EVENT_KIND_COUNT],
    default_capacity: usize,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a bus with the given per-kind buffer capacity.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: Default::default(),
            default_capacity,
        }
    }

    /// Suppress an event kind. Frees its buffer; later emits are no-ops.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event for the next delivery. Buffers are allocated
    /// lazily on first emit of each kind.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(self.default_capacity))
            .push(event);
    }

    /// Register a passive listener for an event kind. Listeners run in
    /// registration order.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.subscribers[kind.index()].push(listener);
    }

    /// Deliver all buffered events oldest-to-newest, then clear the
    /// buffers. Events of a kind with no subscribers are simply dropped.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            let Some(buffer) = self.buffers[idx].as_mut() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }
            let events = buffer.drain_in_order();
            for listener in &mut self.subscribers[idx] {
                for event in &events {
                    listener(event);
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
