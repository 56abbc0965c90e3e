//! Packet source implementations

pub mod replay;
pub mod udp;

pub use replay::{ReplayFrame, ReplaySource};
pub use udp::UdpPacketSource;
