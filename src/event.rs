//! Event fan-out for link state changes.
//!
//! Observers registered with the link manager receive every service,
//! device, and app-channel transition as a [`LinkEvent`]. Delivery is
//! synchronous on the thread the triggering event arrived on, to a
//! snapshot of the listener set taken at that moment.

use std::sync::Arc;

use crate::device::{DeviceId, DeviceState};

/// State-change notifications delivered to registered listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
   /// The profile service proxy became available or was lost.
   ServiceStateChanged { available: bool },
   /// A device transitioned between profile connection states.
   DeviceStateChanged {
      device: DeviceId,
      state: DeviceState,
   },
   /// The app channel was unregistered from the profile service.
   AppUnregistered,
}

/// Trait for observers of link state changes.
///
/// Implementations must tolerate being called from arbitrary threads.
/// A panic inside a listener is contained by the dispatcher and does not
/// affect delivery to other listeners.
pub trait LinkListener: Send + Sync {
   fn on_link_event(&self, event: &LinkEvent);
}

/// Type alias for a shared listener handle.
pub type ListenerHandle = Arc<dyn LinkListener>;
