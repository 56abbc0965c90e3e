//! UDP packet source for simulator telemetry broadcasts

use std::io;
use std::net::SocketAddr;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{info, trace};

use crate::provider::PacketSource;
use crate::{Result, TelemetryError};

/// Receives telemetry datagrams on a bound UDP socket without blocking.
#[derive(Debug)]
pub struct UdpPacketSource {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpPacketSource {
    /// Bind a socket on `addr` (e.g. `0.0.0.0:20777`).
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TelemetryError::network("failed to bind telemetry socket", e))?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| TelemetryError::network("bound socket has no local address", e))?;

        info!(addr = %local_addr, "Telemetry UDP socket bound");
        Ok(Self { socket, local_addr })
    }

    pub fn from_socket(socket: UdpSocket) -> Result<Self> {
        let local_addr = socket
            .local_addr()
            .map_err(|e| TelemetryError::network("socket has no local address", e))?;
        Ok(Self { socket, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl PacketSource for UdpPacketSource {
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.socket.try_recv_from(buf) {
            Ok((len, peer)) => {
                trace!(len, peer = %peer, "Datagram received");
                Ok(Some(len))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(TelemetryError::network("receive failed", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MAX_PACKET_SIZE;

    #[tokio::test]
    async fn empty_socket_reports_nothing_ready() {
        let mut source = UdpPacketSource::bind("127.0.0.1:0").await.unwrap();
        let mut buf = [0u8; MAX_PACKET_SIZE];
        assert!(source.try_recv(&mut buf).unwrap().is_none());
    }

    #[tokio::test]
    async fn datagram_is_delivered() {
        let mut source = UdpPacketSource::bind("127.0.0.1:0").await.unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(&[1, 2, 3, 4], source.local_addr()).await.unwrap();

        let mut buf = [0u8; MAX_PACKET_SIZE];
        let mut received = None;
        for _ in 0..100 {
            if let Some(len) = source.try_recv(&mut buf).unwrap() {
                received = Some(len);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(received, Some(4));
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
    }
}
