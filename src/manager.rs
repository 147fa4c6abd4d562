//! Link manager arbitrating a single active HID host connection.
//!
//! The manager reconciles the host the embedding application wants to
//! reach against the hosts the profile service actually reports, keeps
//! at most one of them active, and fans every state transition out to
//! the registered listeners. Registration is reference-counted: the
//! first listener acquires the underlying service subscription, the last
//! one to leave releases it and disconnects whatever is still attached.

use std::{
   panic::{self, AssertUnwindSafe},
   sync::{Arc, Weak},
};

use log::{debug, warn};
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::{
   config::LinkConfig,
   device::{DeviceId, DeviceState},
   event::{LinkEvent, LinkListener},
   profile::{BatteryEvents, BatterySource, DeviceEvents, HidApp, HidProfile, ServiceEvents},
};

/// States in which the profile service is occupying the link and a new
/// connect request must not be issued yet.
const BUSY_STATES: [DeviceState; 3] = [
   DeviceState::Connected,
   DeviceState::Connecting,
   DeviceState::Disconnecting,
];

type Listeners = SmallVec<[Arc<dyn LinkListener>; 2]>;

/// Mutable state guarded by the manager's single lock.
#[derive(Default)]
struct LinkState {
   listeners: Listeners,

   /// The host we are currently trying to reach, or none to stay
   /// disconnected.
   desired: Option<DeviceId>,

   /// The host considered actively connected and usable for reports.
   current: Option<DeviceId>,
}

struct Inner {
   profile: Arc<dyn HidProfile>,
   app: Arc<dyn HidApp>,
   battery: Arc<dyn BatterySource>,
   config: LinkConfig,
   state: Mutex<LinkState>,
}

/// Arbitrates the HID link on behalf of any number of listeners.
///
/// One instance is owned by the embedding context; clones share it.
/// Every entry point serializes through one lock, and listener callbacks
/// are only ever invoked after that lock has been released, so listeners
/// may re-enter the manager freely.
#[derive(Clone)]
pub struct LinkManager {
   inner: Arc<Inner>,
}

impl LinkManager {
   pub fn new(
      profile: Arc<dyn HidProfile>,
      app: Arc<dyn HidApp>,
      battery: Arc<dyn BatterySource>,
      config: LinkConfig,
   ) -> Self {
      Self {
         inner: Arc::new(Inner {
            profile,
            app,
            battery,
            config,
            state: Mutex::new(LinkState::default()),
         }),
      }
   }

   /// Adds a listener and returns the shared profile service handle.
   ///
   /// Idempotent: re-registering a listener has no side effect. The
   /// first listener acquires the service subscription, hooking the
   /// manager up to profile, device, and battery notifications.
   pub fn register(&self, listener: Arc<dyn LinkListener>) -> Arc<dyn HidProfile> {
      let mut st = self.inner.state.lock();
      if st.listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
         // This user is already registered
         return self.inner.profile.clone();
      }
      st.listeners.push(listener);
      if st.listeners.len() > 1 {
         // There are already some users
         return self.inner.profile.clone();
      }

      let bridge = Arc::new(EventBridge {
         inner: Arc::downgrade(&self.inner),
      });
      self.inner.profile.register_service_listener(bridge.clone());
      self.inner.app.register_device_listener(bridge.clone());
      self.inner.battery.subscribe(bridge);

      self.inner.profile.clone()
   }

   /// Removes a listener; no-op if it was never registered.
   ///
   /// When the last listener leaves, the service subscription is
   /// released: every host the service still reports connected is asked
   /// to disconnect, the app channel is cleared and unregistered, and
   /// the manager resets to idle.
   pub fn unregister(&self, listener: &Arc<dyn LinkListener>) {
      let mut st = self.inner.state.lock();
      let Some(pos) = st.listeners.iter().position(|l| Arc::ptr_eq(l, listener)) else {
         // This user was removed before
         return;
      };
      st.listeners.swap_remove(pos);
      if !st.listeners.is_empty() {
         // Some users are still left
         return;
      }

      self.inner.battery.unsubscribe();
      self.inner.app.unregister_device_listener();

      for device in self.inner.profile.connected_devices() {
         self.inner.profile.disconnect(device);
      }

      self.inner.app.set_active_device(None);
      self.inner.app.unregister_app();
      self.inner.profile.unregister_service_listener();

      st.desired = None;
      st.current = None;
   }

   /// Whether a host is currently active.
   pub fn is_connected(&self) -> bool {
      self.inner.state.lock().current.is_some()
   }

   /// The currently active host, if any.
   pub fn active_device(&self) -> Option<DeviceId> {
      self.inner.state.lock().current
   }

   /// Initiates the connection sequence for the given host. Any other
   /// connected host is disconnected first. `None` means disconnect and
   /// stay idle.
   ///
   /// Supersedes any prior pending request; only the most recent one
   /// matters. Requests made while no listener is registered are
   /// ignored, since there is no service subscription to act through.
   pub fn request_connect(&self, device: Option<DeviceId>) {
      let mut fanout = None;
      {
         let mut st = self.inner.state.lock();
         if st.listeners.is_empty() {
            debug!("ignoring connect request: no active subscription");
            return;
         }

         st.desired = device;
         st.current = None;
         self.inner.reconcile(&mut st);

         // If the target was already attached, the request is satisfied
         // right here; tell the listeners so.
         if let Some(requested) = device
            && st.current == Some(requested)
         {
            fanout = Some((
               st.listeners.clone(),
               LinkEvent::DeviceStateChanged {
                  device: requested,
                  state: DeviceState::Connected,
               },
            ));
         }
      }
      if let Some((listeners, event)) = fanout {
         deliver(&listeners, &event);
      }
   }

   /// Transmits an input report to the active host, if there is one.
   ///
   /// Reports are latency-sensitive and stale ones are worthless, so
   /// with no host active the payload is dropped on the floor: no
   /// queueing, no retry, nothing surfaced to the caller.
   pub fn send_report(&self, report: &[u8]) {
      let st = self.inner.state.lock();
      if st.current.is_some() {
         self.inner.app.send_report(report);
      } else if self.inner.config.log_dropped_reports {
         debug!("dropping {} byte report: no active device", report.len());
      }
   }
}

impl Inner {
   /// Reconciles the desired host against what the profile service
   /// reports. Runs after every request and after every service or
   /// device event; it is the single source of truth for the active
   /// device.
   fn reconcile(&self, st: &mut LinkState) {
      let mut attached = None;

      // If we are connected to some host but want another one (or want
      // to disconnect completely), evict everything that is neither the
      // target nor the one we already hold.
      for device in self.profile.connected_devices() {
         if Some(device) == st.desired || Some(device) == st.current {
            attached = Some(device);
         } else {
            self.profile.disconnect(device);
         }
      }

      // If the link is fully quiet and we still want a host, go get it.
      if self.profile.devices_matching_states(&BUSY_STATES).is_empty()
         && let Some(target) = st.desired
      {
         self.profile.connect(target);
      }

      match (st.current, attached) {
         (None, Some(device)) => {
            // Request satisfied
            st.current = Some(device);
            st.desired = None;
         },
         (Some(_), None) => st.current = None,
         _ => {},
      }

      self.app.set_active_device(st.current);
   }
}

/// Receives callbacks from the profile service, the app channel, and
/// the battery source, funneling them back into the manager. Holds a
/// weak handle so a torn-down manager simply stops reacting.
struct EventBridge {
   inner: Weak<Inner>,
}

impl ServiceEvents for EventBridge {
   fn service_state_changed(&self, available: bool) {
      let Some(inner) = self.inner.upgrade() else {
         return;
      };
      let listeners;
      {
         let mut st = inner.state.lock();
         if available {
            inner.app.register_app(inner.profile.clone());
         }
         inner.reconcile(&mut st);
         listeners = st.listeners.clone();
      }
      deliver(&listeners, &LinkEvent::ServiceStateChanged { available });
   }
}

impl DeviceEvents for EventBridge {
   fn device_state_changed(&self, device: DeviceId, state: DeviceState) {
      let Some(inner) = self.inner.upgrade() else {
         return;
      };
      let listeners;
      {
         let mut st = inner.state.lock();
         if state == DeviceState::Connected && inner.config.adopt_incoming {
            // A new connection was established. If we weren't expecting
            // that, it must be an incoming one; adopt it instead of
            // fighting it.
            st.desired = Some(device);
         }
         inner.reconcile(&mut st);
         listeners = st.listeners.clone();
      }
      deliver(&listeners, &LinkEvent::DeviceStateChanged { device, state });
   }

   fn app_unregistered(&self) {
      let Some(inner) = self.inner.upgrade() else {
         return;
      };
      let listeners = inner.state.lock().listeners.clone();
      deliver(&listeners, &LinkEvent::AppUnregistered);
   }
}

impl BatteryEvents for EventBridge {
   fn battery_changed(&self, level: i32, scale: i32) {
      let Some(inner) = self.inner.upgrade() else {
         return;
      };
      // Stateless relay; touches no guarded state and takes no lock.
      if level >= 0 && scale > 0 {
         inner.app.send_battery_level(level as f32 / scale as f32);
      } else {
         warn!("bad battery level data received: level={level}, scale={scale}");
      }
   }
}

/// Delivers one event to a snapshot of the listener set, one call per
/// listener. A panicking listener is logged and skipped; the remaining
/// deliveries proceed.
fn deliver(listeners: &Listeners, event: &LinkEvent) {
   for listener in listeners {
      if panic::catch_unwind(AssertUnwindSafe(|| listener.on_link_event(event))).is_err() {
         warn!("listener panicked while handling {event:?}");
      }
   }
}
