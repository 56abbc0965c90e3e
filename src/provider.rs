//! Packet source trait

use crate::Result;

/// Largest telemetry datagram the sources deliver, in bytes.
pub const MAX_PACKET_SIZE: usize = 512;

/// Non-blocking source of raw telemetry packets.
///
/// Sources never wait for data: the polling loop owns the cadence and asks
/// once per tick. "Nothing ready" is the normal steady state and is reported
/// as `Ok(None)`, not as an error.
pub trait PacketSource: 'static {
    /// Copy the next pending packet into `buf`.
    ///
    /// Returns:
    /// - `Ok(Some(len))` - a packet of `len` bytes was written to `buf[..len]`
    /// - `Ok(None)` - no packet is ready this tick
    /// - `Err(e)` - the source failed; the caller backs off and retries
    ///
    /// Packets longer than `buf` are truncated to its length.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>>;
}

impl<S: PacketSource + ?Sized> PacketSource for Box<S> {
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        (**self).try_recv(buf)
    }
}
