pub mod comparator;
pub mod confidence;

pub use comparator::Comparator;
pub use confidence::Confidence;
