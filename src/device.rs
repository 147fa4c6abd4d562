//! Device identity and profile connection states.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HidLinkError;

/// Opaque identifier for a remote HID host, in the usual six-octet
/// Bluetooth address form.
///
/// Identifiers are equality-comparable only; no ordering is exposed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub [u8; 6]);

impl DeviceId {
   pub const fn new(octets: [u8; 6]) -> Self {
      Self(octets)
   }

   /// The all-zero address, useful as a placeholder in tests.
   pub const fn any() -> Self {
      Self([0; 6])
   }
}

impl fmt::Display for DeviceId {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let [a, b, c, d, e, g] = self.0;
      write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
   }
}

impl fmt::Debug for DeviceId {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      fmt::Display::fmt(self, f)
   }
}

impl FromStr for DeviceId {
   type Err = HidLinkError;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      let mut octets = [0u8; 6];
      let mut parts = s.split(':');
      for octet in &mut octets {
         let part = parts
            .next()
            .ok_or_else(|| HidLinkError::InvalidDeviceId(s.to_string()))?;
         *octet = u8::from_str_radix(part, 16)
            .map_err(|_| HidLinkError::InvalidDeviceId(s.to_string()))?;
      }
      if parts.next().is_some() {
         return Err(HidLinkError::InvalidDeviceId(s.to_string()));
      }
      Ok(Self(octets))
   }
}

/// Connection state of a device as reported by the profile service.
#[repr(u8)]
#[derive(
   Debug,
   Clone,
   Copy,
   PartialEq,
   Eq,
   Serialize,
   Deserialize,
   strum::FromRepr,
   strum::Display,
   strum::EnumString,
)]
pub enum DeviceState {
   Disconnected = 0x00,
   Connecting = 0x01,
   Connected = 0x02,
   Disconnecting = 0x03,
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_device_id_display_roundtrip() {
      let id = DeviceId::new([0xAA, 0xBB, 0xCC, 0x01, 0x02, 0x03]);
      assert_eq!(id.to_string(), "AA:BB:CC:01:02:03");
      assert_eq!("AA:BB:CC:01:02:03".parse::<DeviceId>().unwrap(), id);
      // Lowercase input parses too
      assert_eq!("aa:bb:cc:01:02:03".parse::<DeviceId>().unwrap(), id);
   }

   #[test]
   fn test_device_id_rejects_malformed_input() {
      assert!("AA:BB:CC:01:02".parse::<DeviceId>().is_err());
      assert!("AA:BB:CC:01:02:03:04".parse::<DeviceId>().is_err());
      assert!("AA:BB:CC:01:02:ZZ".parse::<DeviceId>().is_err());
      assert!("".parse::<DeviceId>().is_err());
   }

   #[test]
   fn test_device_state_repr_matches_profile_constants() {
      assert_eq!(DeviceState::from_repr(0x00), Some(DeviceState::Disconnected));
      assert_eq!(DeviceState::from_repr(0x02), Some(DeviceState::Connected));
      assert_eq!(DeviceState::from_repr(0x04), None);
   }
}
