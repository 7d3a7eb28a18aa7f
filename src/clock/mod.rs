pub mod frame;
pub mod span;

pub use frame::Frame;
pub use span::Span;

use crate::Delta;

/// fractional seconds of a duration. sub-second resolution matters for
/// clipped windows, so we go through microseconds where they fit.
pub fn seconds(delta: Delta) -> f64 {
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
