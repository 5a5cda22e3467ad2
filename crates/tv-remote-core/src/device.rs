//! The record discovery produces for each responding TV.

use std::fmt;

/// A device found on the local network.
///
/// Produced by discovery, shown in the device picker, and discarded once the
/// user has chosen one.  Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The `friendlyName` from the device's UPnP descriptor.
    pub name: String,
    /// Bare host (IP or hostname) taken from the descriptor URL, no port.
    pub address: String,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_shows_name_and_address() {
        let device = DeviceInfo::new("[TV] Living Room", "192.168.0.107");
        assert_eq!(device.to_string(), "[TV] Living Room (192.168.0.107)");
    }
}
