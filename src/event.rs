//! Event handling.
//!
//! This library exposes an event-based interface for reacting
//! to the state changes of the machine in real-time. [EventListeners](EventListener)
//! can be registered on the [ControlUnit](crate::machine::ControlUnit) with the
//! [add_listener](crate::machine::ControlUnit::add_listener) method, or on a
//! [Simulation](crate::simulation::Simulation).
//!
//! A blanket implementation of [EventListener] for all `Fn(&Event)` is provided.

/// Represents an event that occurred while executing a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A pending input was accepted and control moved to the interrupt handler.
    InterruptEnter {
        /// The address execution continues from after the handler returns.
        return_address: u32,

        /// Address of the interrupt handler.
        vector: u32,
    },

    /// The interrupt handler returned.
    InterruptExit {
        return_address: u32,
    },

    /// The program read an input symbol.
    Input {
        symbol: u32,
    },

    /// The program wrote a symbol to the output buffer.
    Output {
        symbol: u32,
    },

    /// The program modified a memory location.
    MemoryChange {
        /// The address of the changed memory location.
        address: u32,

        /// New value of the changed memory location.
        data: u32,
    },

    /// The program executed `HALT`.
    Halt {
        address: u32,
    },
}

/// Trait for consuming events.
pub trait EventListener {
    /// Called whenever a new event has been created.
    fn event(&mut self, event: &Event);
}

impl<F> EventListener for F where F: Fn(&Event) {
    fn event(&mut self, event: &Event) {
        self(event)
    }
}

#[derive(Default)]
pub(crate) struct EventDispatcher {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventDispatcher {
    pub fn new() -> EventDispatcher {
        EventDispatcher {
            listeners: Vec::new(),
        }
    }

    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener) as Box<dyn EventListener>)
    }

    pub fn dispatch(&mut self, event: Event) {
        for listener in &mut self.listeners {
            listener.event(&event);
        }
    }
}
