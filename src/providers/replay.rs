//! Replay source for scripted packet sequences

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::Result;
use crate::provider::PacketSource;

/// A packet and when it becomes available, relative to the first poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayFrame {
    pub at: Duration,
    pub data: Vec<u8>,
}

impl ReplayFrame {
    pub fn new(at: Duration, data: impl Into<Vec<u8>>) -> Self {
        Self { at, data: data.into() }
    }
}

/// Plays back recorded packets on their original timeline.
///
/// The clock starts at the first `try_recv` call. Frames are released in
/// order once their offset has elapsed; at most one frame per call, so a
/// late poll drains the backlog one packet per tick like a socket would.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: VecDeque<ReplayFrame>,
    started: Option<Instant>,
    delivered: u64,
}

impl ReplaySource {
    /// Frames are sorted by offset; equal offsets keep their given order.
    pub fn new(mut frames: Vec<ReplayFrame>) -> Self {
        frames.sort_by_key(|frame| frame.at);
        info!(frames = frames.len(), "Replay source loaded");
        Self { frames: frames.into(), started: None, delivered: 0 }
    }

    /// `count` copies of `data`, one every `period`, starting at `start`.
    pub fn periodic(
        data: &[u8],
        start: Duration,
        period: Duration,
        count: u32,
    ) -> Vec<ReplayFrame> {
        (0..count).map(|i| ReplayFrame::new(start + period * i, data)).collect()
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl PacketSource for ReplaySource {
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let started = *self.started.get_or_insert_with(Instant::now);
        let elapsed = started.elapsed();

        let due = self.frames.front().is_some_and(|frame| frame.at <= elapsed);
        if !due {
            return Ok(None);
        }
        let Some(frame) = self.frames.pop_front() else {
            return Ok(None);
        };

        let len = frame.data.len().min(buf.len());
        buf[..len].copy_from_slice(&frame.data[..len]);
        self.delivered += 1;

        if self.frames.is_empty() {
            debug!(delivered = self.delivered, "Replay finished");
        }
        Ok(Some(len))
    }
}
