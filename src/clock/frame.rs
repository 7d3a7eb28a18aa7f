use crate::Delta;
use crate::Stamp;

/// absolute half-open time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub start: Stamp,
    pub end: Stamp,
}

impl From<(Stamp, Stamp)> for Frame {
    fn from((start, end): (Stamp, Stamp)) -> Self {
        Self { start, end }
    }
}

impl Frame {
    pub fn duration(&self) -> Delta {
        self.end - self.start
    }
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{} - {})", self.start, self.end)
    }
}
