use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// A 6-octet Bluetooth device address, stored most significant octet first
/// (the order it is written in, e.g. `00:16:53:12:5C:67`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr([u8; 6]);

impl BdAddr {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Kernel `bdaddr_t` layout: least significant octet first.
    pub fn to_le_bytes(&self) -> [u8; 6] {
        let mut out = self.0;
        out.reverse();
        out
    }

    pub fn from_le_bytes(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    /// Returns true if `s` is syntactically a colon-separated 6-octet hex
    /// address rather than a friendly name.
    pub fn is_address(s: &str) -> bool {
        s.parse::<BdAddr>().is_ok()
    }
}

impl FromStr for BdAddr {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransportError::InvalidAddress(s.to_string());
        if s.len() != 17 {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Where a radio connection should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioTarget {
    /// A literal hardware address.
    Address(BdAddr),
    /// A friendly name, resolved through discovery.
    Name(String),
}

impl RadioTarget {
    /// Classify a destination string. Anything that is not an address is a
    /// friendly name; only the empty string is rejected.
    pub fn parse(destination: &str) -> Result<Self, TransportError> {
        if destination.is_empty() {
            return Err(TransportError::InvalidAddress(String::new()));
        }
        match destination.parse::<BdAddr>() {
            Ok(addr) => Ok(Self::Address(addr)),
            Err(_) => Ok(Self::Name(destination.to_string())),
        }
    }
}
