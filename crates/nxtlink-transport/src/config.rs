use std::time::Duration;

/// USB vendor id of the brick's manufacturer.
pub const USB_VENDOR_LEGO: u16 = 0x0694;

/// USB product id of the brick.
pub const USB_PRODUCT_NXT: u16 = 0x0002;

/// Default radio destination: the brick's factory friendly name.
pub const DEFAULT_RADIO_DESTINATION: &str = "NXT";

/// Configuration for the Bluetooth RFCOMM backend.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// RFCOMM channel the brick listens on.
    pub channel: u8,
    /// Inquiry duration in units of 1.28 s.
    pub inquiry_length: u8,
    /// Maximum number of inquiry responses collected.
    pub max_responses: u8,
    /// How long to wait for each remote name request.
    pub name_timeout: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: 1,
            inquiry_length: 8,
            max_responses: 255,
            name_timeout: Duration::from_secs(5),
        }
    }
}

/// Configuration for the USB bulk backend.
#[derive(Debug, Clone)]
pub struct UsbConfig {
    /// Interface claimed on open.
    pub interface: u8,
    /// Bulk OUT endpoint address.
    pub endpoint_out: u8,
    /// Bulk IN endpoint address.
    pub endpoint_in: u8,
    /// Per-transfer timeout. `Duration::ZERO` waits indefinitely.
    pub timeout: Duration,
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            interface: 0,
            endpoint_out: 0x01,
            endpoint_in: 0x82,
            timeout: Duration::ZERO,
        }
    }
}
