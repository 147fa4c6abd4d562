//! Collaborator contracts for the platform HID stack.
//!
//! The link manager does not own a wire protocol; it sits between an
//! embedding application and the platform's HID profile service. These
//! traits describe that boundary: the profile service which tracks host
//! connections, the app channel which carries outbound reports, and the
//! battery source which feeds periodic charge readings.
//!
//! Connect and disconnect requests are fire-and-forget: their outcomes
//! arrive later through the registered event callbacks. Implementations
//! must NOT invoke any of the event callbacks synchronously from within
//! a request call, since the caller may still be holding the manager's
//! state lock.

use std::sync::Arc;

use crate::device::{DeviceId, DeviceState};

/// Handle to the platform HID profile service.
pub trait HidProfile: Send + Sync {
   /// Requests a connection to the given host. Asynchronous; completion
   /// is reported through [`DeviceEvents::device_state_changed`].
   fn connect(&self, device: DeviceId);

   /// Requests disconnection from the given host. Asynchronous.
   fn disconnect(&self, device: DeviceId);

   /// Hosts the service currently reports as connected.
   fn connected_devices(&self) -> Vec<DeviceId>;

   /// Hosts currently in any of the given states.
   fn devices_matching_states(&self, states: &[DeviceState]) -> Vec<DeviceId>;

   fn register_service_listener(&self, events: Arc<dyn ServiceEvents>);
   fn unregister_service_listener(&self);
}

/// The app channel: carries outbound traffic to whichever host is
/// currently active.
pub trait HidApp: Send + Sync {
   /// Registers the app record with the profile service proxy.
   fn register_app(&self, proxy: Arc<dyn HidProfile>);
   fn unregister_app(&self);

   /// Points the channel at the host all subsequent reports go to, or
   /// at none.
   fn set_active_device(&self, device: Option<DeviceId>);

   /// Transmits an input report to the active host.
   fn send_report(&self, report: &[u8]);

   /// Forwards the host battery charge as a fraction in `0.0..=1.0`.
   fn send_battery_level(&self, level: f32);

   fn register_device_listener(&self, events: Arc<dyn DeviceEvents>);
   fn unregister_device_listener(&self);
}

/// Source of periodic battery charge readings.
pub trait BatterySource: Send + Sync {
   fn subscribe(&self, events: Arc<dyn BatteryEvents>);
   fn unsubscribe(&self);
}

/// Callbacks from the profile service about its own availability.
pub trait ServiceEvents: Send + Sync {
   /// The service proxy was acquired (`true`) or lost (`false`).
   fn service_state_changed(&self, available: bool);
}

/// Callbacks from the app channel about device and app state.
pub trait DeviceEvents: Send + Sync {
   fn device_state_changed(&self, device: DeviceId, state: DeviceState);
   fn app_unregistered(&self);
}

/// Callbacks from the battery source.
pub trait BatteryEvents: Send + Sync {
   /// A raw charge reading. `level` is valid when non-negative, `scale`
   /// when positive; the pair encodes the fraction `level / scale`.
   fn battery_changed(&self, level: i32, scale: i32);
}
