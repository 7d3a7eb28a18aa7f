use super::feature::Direction;
use super::feature::Speed;
use super::slice::Slice;
use crate::Stamp;
use serde::Deserialize;
use serde::Serialize;

/// feature values of one agent over one segment of its trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub start: Stamp,
    pub end: Stamp,
    pub speed: Speed,
    pub direction: Direction,
}

impl Motion {
    pub fn new(start: Stamp, end: Stamp, speed: Speed, direction: Direction) -> Self {
        Self {
            start,
            end,
            speed,
            direction,
        }
    }
}

impl Slice for Motion {
    fn start(&self) -> Stamp {
        self.start
    }
    fn end(&self) -> Stamp {
        self.end
    }
    fn clip(&self, start: Stamp, end: Stamp) -> Self {
        Self {
            start: start.max(self.start),
            end: end.min(self.end),
            ..*self
        }
    }
}

impl std::fmt::Display for Motion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} for {}s", self.speed, self.direction, crate::clock::seconds(self.duration()))
    }
}
