use crate::rank::Comparator;
use crate::rank::Confidence;

/// how a conjunction of expectations folds partial confidences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Strategy {
    /// the weakest expectation decides
    Min,
    /// every expectation contributes evidence
    #[default]
    Avg,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Avg => write!(f, "avg"),
        }
    }
}

/// per-query tuning bundle. the two search knobs that trade accuracy
/// for cost are the pruning floor and the bounded memoization depth.
#[derive(Debug, Clone)]
pub struct Config {
    /// comparator trade-off t between conformity and reliability
    pub tradeoff: f64,
    /// conformity floor below which a path step prunes
    pub min_confidence: f64,
    /// best paths remembered per graph vertex
    pub max_memory: usize,
    pub strategy: Strategy,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tradeoff: crate::TRADEOFF,
            min_confidence: crate::MIN_CONFIDENCE,
            max_memory: crate::MAX_MEMORY,
            strategy: Strategy::default(),
            debug: false,
        }
    }
}

impl Config {
    pub fn comparator(&self) -> Comparator {
        Comparator::new(self.tradeoff)
    }
    /// the pruning floor as a confidence
    pub fn floor(&self) -> Confidence {
        Confidence(self.min_confidence, 1.0)
    }
    /// the default floor of a confidence restriction, halfway between
    /// the pruning floor and certainty
    pub fn must_floor(&self) -> Confidence {
        Confidence(
            self.min_confidence + (1.0 - self.min_confidence) / 2.0,
            1.0,
        )
    }
}
