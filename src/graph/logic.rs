use super::layer::Layer;
use crate::rank::Comparator;
use crate::rank::Confidence;
use crate::search::config::Strategy;

/// conjunction over child layers. the MIN strategy keeps the comparator
/// minimum of the children; the AVG strategy takes the componentwise
/// mean so every child contributes evidence.
pub struct All {
    pub children: Vec<Box<dyn Layer>>,
    pub strategy: Strategy,
    pub comparator: Comparator,
}

impl Layer for All {
    fn confidence(&self, i: usize, j: usize) -> Confidence {
        let spans = self.children.iter().map(|c| c.confidence(i, j));
        match self.strategy {
            Strategy::Min => spans
                .reduce(|best, c| match self.comparator.order(&c, &best) {
                    std::cmp::Ordering::Less => c,
                    _ => best,
                })
                .expect("conjunction has children"),
            Strategy::Avg => {
                let count = self.children.len() as f64;
                let total: Confidence = spans.sum();
                Confidence(total.0 / count, total.1 / count)
            }
        }
    }
}

/// disjunction over child layers: the comparator maximum, first child
/// winning ties
pub struct Any {
    pub children: Vec<Box<dyn Layer>>,
    pub comparator: Comparator,
}

impl Layer for Any {
    fn confidence(&self, i: usize, j: usize) -> Confidence {
        self.children
            .iter()
            .map(|c| c.confidence(i, j))
            .reduce(|best, c| match self.comparator.order(&c, &best) {
                std::cmp::Ordering::Greater => c,
                _ => best,
            })
            .expect("disjunction has children")
    }
}

/// negation: matched time flips into unmatched time over the same
/// evidence
pub struct Not {
    pub child: Box<dyn Layer>,
}

impl Layer for Not {
    fn confidence(&self, i: usize, j: usize) -> Confidence {
        let inner = self.child.confidence(i, j);
        Confidence(inner.1 - inner.0, inner.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::dense::Dense;

    fn walk() -> Box<dyn Layer> {
        Box::new(Dense::from(vec![Confidence(1.0, 1.0), Confidence(0.0, 1.0)]))
    }
    fn stand() -> Box<dyn Layer> {
        Box::new(Dense::from(vec![Confidence(0.0, 1.0), Confidence(1.0, 1.0)]))
    }

    #[test]
    fn conjunction_avg_means_components() {
        let layer = All {
            children: vec![walk(), stand()],
            strategy: Strategy::Avg,
            comparator: Comparator::default(),
        };
        assert_eq!(layer.confidence(0, 2), Confidence(1.0, 2.0));
        assert_eq!(layer.confidence(0, 1), Confidence(0.5, 1.0));
    }

    #[test]
    fn conjunction_min_keeps_the_weakest() {
        let layer = All {
            children: vec![walk(), stand()],
            strategy: Strategy::Min,
            comparator: Comparator::default(),
        };
        assert_eq!(layer.confidence(0, 1), Confidence(0.0, 1.0));
        assert_eq!(layer.confidence(1, 2), Confidence(0.0, 1.0));
    }

    #[test]
    fn disjunction_keeps_the_strongest() {
        let layer = Any {
            children: vec![walk(), stand()],
            comparator: Comparator::default(),
        };
        assert_eq!(layer.confidence(0, 1), Confidence(1.0, 1.0));
        assert_eq!(layer.confidence(1, 2), Confidence(1.0, 1.0));
    }

    #[test]
    fn negation_flips_within_the_evidence() {
        let layer = Not { child: walk() };
        assert_eq!(layer.confidence(0, 1), Confidence(0.0, 1.0));
        assert_eq!(layer.confidence(1, 2), Confidence(1.0, 1.0));
        assert_eq!(layer.confidence(0, 2), Confidence(1.0, 2.0));
    }

    #[test]
    fn negation_is_an_involution() {
        let twice = Not {
            child: Box::new(Not { child: walk() }),
        };
        let once = walk();
        for (i, j) in [(0, 1), (1, 2), (0, 2)] {
            assert_eq!(twice.confidence(i, j), once.confidence(i, j));
        }
    }

    #[test]
    fn negation_of_the_corners() {
        let layer = Not {
            child: Box::new(Dense::from(vec![])),
        };
        // an impossible child span turns into unconditional truth
        assert_eq!(layer.confidence(0, 1), Confidence::ABSOLUTE);
    }
}
