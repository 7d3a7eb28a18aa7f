use serde::Deserialize;
use serde::Serialize;

/// unary: pace of an agent's movement
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speed {
    Stand,
    Walk,
    Run,
}

/// unary: course w.r.t. the agent's previous movement.
/// binary: course of the actor w.r.t. the target agent.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    NotMoving,
    Left,
    Straight,
    Right,
    Opposite,
}

/// binary: relation between the courses of both agents
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutualDirection {
    Parallel,
    Independent,
    Opposite,
}

/// binary: change of the gap between both agents. "intended" reads the
/// actor's movement against the target's last position, "actual" the
/// movement of both.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceChange {
    Decreasing,
    Constant,
    Increasing,
}

/// binary: coarse gap between both agents
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Adjacent,
    Near,
    Far,
}

impl Speed {
    pub const fn all() -> &'static [Self] {
        &[Self::Stand, Self::Walk, Self::Run]
    }
}

impl Direction {
    pub const fn all() -> &'static [Self] {
        &[
            Self::NotMoving,
            Self::Left,
            Self::Straight,
            Self::Right,
            Self::Opposite,
        ]
    }
}

impl MutualDirection {
    pub const fn all() -> &'static [Self] {
        &[Self::Parallel, Self::Independent, Self::Opposite]
    }
}

impl DistanceChange {
    pub const fn all() -> &'static [Self] {
        &[Self::Decreasing, Self::Constant, Self::Increasing]
    }
}

impl Distance {
    pub const fn all() -> &'static [Self] {
        &[Self::Adjacent, Self::Near, Self::Far]
    }
}

macro_rules! feature_display {
    ($feature:ty) => {
        impl std::fmt::Display for $feature {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        impl crate::Arbitrary for $feature {
            fn random() -> Self {
                use rand::seq::SliceRandom;
                Self::all()
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .expect("non-empty feature domain")
            }
        }
    };
}

feature_display!(Speed);
feature_display!(Direction);
feature_display!(MutualDirection);
feature_display!(DistanceChange);
feature_display!(Distance);
