//! USB bulk-transfer backend.
//!
//! Every transfer carries exactly one protocol message, so no framing is
//! applied on top of it.

use rusb::{DeviceHandle, GlobalContext};
use tracing::debug;

use crate::config::{UsbConfig, USB_PRODUCT_NXT, USB_VENDOR_LEGO};
use crate::error::{Result, TransportError};
use crate::traits::Backend;

/// An open, claimed USB interface on the brick.
pub struct UsbBulk {
    handle: Option<DeviceHandle<GlobalContext>>,
    vendor: u16,
    product: u16,
    config: UsbConfig,
}

impl UsbBulk {
    /// Open the brick by its factory vendor/product identity.
    pub fn open_default() -> Result<Self> {
        Self::open(USB_VENDOR_LEGO, USB_PRODUCT_NXT)
    }

    /// Open the first device matching `vendor`/`product`.
    pub fn open(vendor: u16, product: u16) -> Result<Self> {
        Self::open_with_config(vendor, product, &UsbConfig::default())
    }

    /// Open with explicit interface, endpoints and timeout.
    pub fn open_with_config(vendor: u16, product: u16, config: &UsbConfig) -> Result<Self> {
        let mut handle = rusb::open_device_with_vid_pid(vendor, product)
            .ok_or(TransportError::DeviceNotFound { vendor, product })?;

        handle
            .claim_interface(config.interface)
            .map_err(|source| TransportError::Claim {
                vendor,
                product,
                source,
            })?;

        debug!(vendor, product, interface = config.interface, "opened usb device");

        Ok(Self {
            handle: Some(handle),
            vendor,
            product,
            config: config.clone(),
        })
    }

    /// The `(vendor, product)` identity this backend was opened with.
    pub fn identity(&self) -> (u16, u16) {
        (self.vendor, self.product)
    }

    fn handle(&self) -> Result<&DeviceHandle<GlobalContext>> {
        self.handle.as_ref().ok_or(TransportError::Closed)
    }
}

impl Backend for UsbBulk {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let handle = self.handle()?;
        Ok(handle.read_bulk(self.config.endpoint_in, buf, self.config.timeout)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let handle = self.handle()?;
        Ok(handle.write_bulk(self.config.endpoint_out, buf, self.config.timeout)?)
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut handle) = self.handle.take() else {
            return Ok(());
        };
        debug!(vendor = self.vendor, product = self.product, "closing usb device");
        handle.release_interface(self.config.interface)?;
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "usb-bulk"
    }
}

impl std::fmt::Debug for UsbBulk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbBulk")
            .field("vendor", &format_args!("{:04x}", self.vendor))
            .field("product", &format_args!("{:04x}", self.product))
            .field("open", &self.handle.is_some())
            .finish()
    }
}
