use super::layer::Layer;
use crate::clock::Span;
use crate::rank::Comparator;
use crate::rank::Confidence;
use crate::Delta;

/// time restriction: a span is only admissible while its total window
/// duration satisfies the requirement, anything else is pruned
pub struct Within {
    child: Box<dyn Layer>,
    span: Span,
    elapsed: Vec<Delta>,
}

impl Within {
    pub fn new(child: Box<dyn Layer>, span: Span, durations: &[Delta]) -> Self {
        let mut elapsed = Vec::with_capacity(durations.len() + 1);
        let mut acc = Delta::zero();
        elapsed.push(acc);
        for duration in durations {
            acc += *duration;
            elapsed.push(acc);
        }
        Self {
            child,
            span,
            elapsed,
        }
    }
}

impl Layer for Within {
    fn confidence(&self, i: usize, j: usize) -> Confidence {
        let duration = self.elapsed[j] - self.elapsed[i];
        match self.span.admits(duration) {
            true => self.child.confidence(i, j),
            false => Confidence::IMPOSSIBLE,
        }
    }
}

/// confidence restriction: a span below the floor, by the tight
/// conformity comparison, is pruned
pub struct Must {
    pub child: Box<dyn Layer>,
    pub floor: Confidence,
}

impl Layer for Must {
    fn confidence(&self, i: usize, j: usize) -> Confidence {
        let inner = self.child.confidence(i, j);
        match Comparator::conformity().order(&inner, &self.floor) {
            std::cmp::Ordering::Less => Confidence::IMPOSSIBLE,
            _ => inner,
        }
    }
}
