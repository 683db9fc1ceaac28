//! Backend abstraction for NXT links.
//!
//! Provides a unified interface over the physical transports a brick can be
//! reached through:
//! - Bluetooth RFCOMM sockets (Linux, stream-oriented)
//! - USB bulk transfers (packet-oriented)
//! - User-supplied backends implementing [`Backend`]
//!
//! This is the lowest layer of nxtlink. Framing and the direct-command codec
//! build on top of the [`Backend`] contract defined here.

pub mod address;
pub mod config;
pub mod discovery;
pub mod error;
pub mod traits;

#[cfg(all(feature = "radio", target_os = "linux"))]
pub mod radio;

#[cfg(feature = "usb")]
pub mod usb;

pub use address::{BdAddr, RadioTarget};
pub use config::{
    RadioConfig, UsbConfig, DEFAULT_RADIO_DESTINATION, USB_PRODUCT_NXT, USB_VENDOR_LEGO,
};
pub use discovery::{resolve_name, PeerScanner};
pub use error::{Result, TransportError};
pub use traits::Backend;

#[cfg(all(feature = "radio", target_os = "linux"))]
pub use radio::RadioSocket;

#[cfg(feature = "usb")]
pub use usb::UsbBulk;
