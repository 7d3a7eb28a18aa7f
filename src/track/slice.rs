use crate::clock::Frame;
use crate::Delta;
use crate::Stamp;

/// a time-bounded block that can be cut down to a sub-interval.
/// clipping clamps to the block's own bounds, so callers may pass the
/// enclosing window's bounds directly.
pub trait Slice: Sized + Clone {
    fn start(&self) -> Stamp;
    fn end(&self) -> Stamp;
    fn clip(&self, start: Stamp, end: Stamp) -> Self;

    fn duration(&self) -> Delta {
        self.end() - self.start()
    }
}

/// cut an ordered block list down to the sub-list covering a frame,
/// truncating the blocks that straddle its borders
pub fn clip_blocks<T: Slice>(blocks: &[T], frame: &Frame) -> Vec<T> {
    blocks
        .iter()
        .filter(|b| b.start() < frame.end && frame.start < b.end())
        .map(|b| b.clip(frame.start, frame.end))
        .collect()
}
