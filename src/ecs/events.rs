use std::panic::{self, AssertUnwindSafe};

use crate::behavior::{AgentState, Animation};
use crate::creature::Species;

/// Things the simulation tells the outside world about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    StateChanged {
        entity: hecs::Entity,
        species: Species,
        from: AgentState,
        to: AgentState,
        animation: Animation,
    },
    Despawned {
        entity: hecs::Entity,
    },
}

type Listener = Box<dyn FnMut(&SimEvent)>;

/// Fan-out of [`SimEvent`]s to named listeners.
///
/// A listener that panics is logged and skipped; the rest still run.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(String, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, name: impl Into<String>, listener: impl FnMut(&SimEvent) + 'static) {
        self.listeners.push((name.into(), Box::new(listener)));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener. Returns how many panicked.
    pub fn dispatch(&mut self, event: &SimEvent) -> usize {
        let mut failed = 0;
        for (name, listener) in &mut self.listeners {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
            if delivered.is_err() {
                log::error!("event listener `{name}` panicked handling {event:?}");
                failed += 1;
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn faulty_listener_does_not_stop_others() {
        let mut world = hecs::World::new();
        let entity = world.spawn((1u8,));

        let seen = Rc::new(Cell::new(0));
        let mut bus = EventBus::new();
        let before = Rc::clone(&seen);
        bus.subscribe("before", move |_| before.set(before.get() + 1));
        bus.subscribe("broken", |_| panic!("listener bug"));
        let after = Rc::clone(&seen);
        bus.subscribe("after", move |_| after.set(after.get() + 1));

        let failed = bus.dispatch(&SimEvent::Despawned { entity });
        assert_eq!(failed, 1);
        assert_eq!(seen.get(), 2);

        // Still subscribed and still isolated next time.
        assert_eq!(bus.dispatch(&SimEvent::Despawned { entity }), 1);
        assert_eq!(seen.get(), 4);
        assert_eq!(bus.len(), 3);
    }
}
