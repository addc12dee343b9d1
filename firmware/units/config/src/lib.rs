//! Board configuration unit.
//!
//! Linking this unit forces `nic` into the image. Nothing here calls into
//! `nic`; the dependency exists only through `require!`.

#![no_std]

use fw_object::{dbg1, dbg_assert};

fw_object::object!(config);
fw_object::require!(nic from nic);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub mac: [u8; 6],
    pub mtu: u16,
}

impl Settings {
    pub const DEFAULT: Self = Self {
        mac: [0x52, 0x54, 0x00, 0x00, 0x00, 0x01],
        mtu: 1500,
    };

    /// Whether the MAC is a usable unicast address.
    #[must_use]
    pub fn has_unicast_mac(&self) -> bool {
        self.mac[0] & 0x01 == 0 && self.mac != [0; 6]
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Checks `settings` before they are handed to the network unit.
#[must_use]
pub fn validate(settings: &Settings) -> bool {
    dbg_assert!(settings.mtu >= 68);
    dbg1!("mtu {} mac {:02x?}", settings.mtu, settings.mac);
    settings.has_unicast_mac() && settings.mtu >= 68
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mac_is_unicast() {
        assert!(Settings::default().has_unicast_mac());
        let multicast = Settings {
            mac: [0x01, 0x00, 0x5e, 0x00, 0x00, 0x01],
            ..Settings::DEFAULT
        };
        assert!(!multicast.has_unicast_mac());
    }

    #[test]
    fn validate_rejects_tiny_mtu() {
        assert!(validate(&Settings::DEFAULT));
        let tiny = Settings {
            mtu: 40,
            ..Settings::DEFAULT
        };
        assert!(!validate(&tiny));
    }
}
