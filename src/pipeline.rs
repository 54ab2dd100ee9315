//! Frame plumbing between the capture thread and the overlay loop.

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::types::Frame;

/// Bounded single-slot channel; the capture side uses `try_send`, so frames
/// the overlay loop has no time for are dropped instead of queued.
pub fn frame_channel() -> (Sender<Frame>, Receiver<Frame>) {
    bounded(1)
}

/// Blocks for the next frame, then drains anything newer that arrived while
/// the previous frame was being processed. Returns `None` once the capture
/// side hung up.
pub fn recv_latest_frame(frame_rx: &Receiver<Frame>) -> Option<Frame> {
    let mut frame = frame_rx.recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}
