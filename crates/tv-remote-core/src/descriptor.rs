//! UPnP device descriptor parsing.
//!
//! Every SSDP response carries a `LOCATION` URL.  Fetching it returns an XML
//! document describing the device:
//!
//! ```xml
//! <root xmlns="urn:schemas-upnp-org:device-1-0">
//!   <specVersion><major>1</major><minor>0</minor></specVersion>
//!   <device>
//!     <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
//!     <friendlyName>[TV] Living Room</friendlyName>
//!     <manufacturer>Samsung Electronics</manufacturer>
//!     <modelName>UE55RU7400</modelName>
//!     ...
//!   </device>
//! </root>
//! ```
//!
//! Only the fields below are read; everything else is ignored.

use serde::Deserialize;
use thiserror::Error;

/// The descriptor document body could not be parsed.
#[derive(Debug, Error, PartialEq)]
#[error("invalid device descriptor: {0}")]
pub struct DescriptorParseError(pub String);

/// Root element of a UPnP device descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceDescriptor {
    pub device: DescribedDevice,
}

/// The `<device>` element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DescribedDevice {
    #[serde(rename = "friendlyName")]
    pub friendly_name: String,
    #[serde(rename = "manufacturer", default)]
    pub manufacturer: Option<String>,
    #[serde(rename = "modelName", default)]
    pub model_name: Option<String>,
}

/// Parses a descriptor document.
///
/// # Errors
///
/// Returns [`DescriptorParseError`] if the body is not well-formed XML or has
/// no `device/friendlyName` element.
pub fn parse_descriptor(xml: &str) -> Result<DeviceDescriptor, DescriptorParseError> {
    quick_xml::de::from_str(xml).map_err(|e| DescriptorParseError(e.to_string()))
}
