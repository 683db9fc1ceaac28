//! Friendly-name resolution for radio destinations.

use tracing::{debug, trace};

use crate::address::BdAddr;
use crate::error::{Result, TransportError};

/// Something that can enumerate nearby radio peers and ask for their names.
pub trait PeerScanner {
    /// Run an inquiry and return the addresses of every peer that answered.
    fn scan(&mut self) -> std::io::Result<Vec<BdAddr>>;

    /// Ask a peer for its human-readable name.
    fn remote_name(&mut self, addr: &BdAddr) -> std::io::Result<String>;
}

/// Resolve `name` to the address of the first discovered peer whose remote
/// name matches exactly.
///
/// Peers whose name request fails are skipped. A failed scan is reported as
/// [`TransportError::Discovery`]; no match as [`TransportError::NameNotFound`].
pub fn resolve_name<S: PeerScanner + ?Sized>(scanner: &mut S, name: &str) -> Result<BdAddr> {
    let peers = scanner.scan().map_err(TransportError::Discovery)?;
    debug!(count = peers.len(), name, "radio inquiry complete");

    for addr in peers {
        match scanner.remote_name(&addr) {
            Ok(remote) if remote == name => {
                debug!(%addr, name, "resolved radio name");
                return Ok(addr);
            }
            Ok(remote) => trace!(%addr, remote = %remote, "name does not match"),
            Err(err) => debug!(%addr, error = %err, "remote name request failed"),
        }
    }

    Err(TransportError::NameNotFound(name.to_string()))
}
