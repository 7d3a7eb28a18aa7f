use super::layer::Layer;
use crate::rank::Confidence;
use std::collections::BTreeMap;

/// the best paths of a computed time graph packaged as a layer, keyed
/// by their first and last vertex. spans with no surviving path read as
/// impartial, so an outer composition can skip them without pruning the
/// whole assignment.
#[derive(Default)]
pub struct Contracted {
    paths: BTreeMap<(usize, usize), (Vec<usize>, Confidence)>,
}

impl Contracted {
    /// the best path arrives first per key and wins
    pub fn insert(&mut self, path: Vec<usize>, confidence: Confidence) {
        let first = *path.first().expect("non-empty path");
        let last = *path.last().expect("non-empty path");
        self.paths
            .entry((first, last))
            .or_insert((path, confidence));
    }

    pub fn paths(&self) -> impl Iterator<Item = (&Vec<usize>, &Confidence)> {
        self.paths.values().map(|(path, confidence)| (path, confidence))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Layer for Contracted {
    fn confidence(&self, i: usize, j: usize) -> Confidence {
        self.paths
            .get(&(i, j))
            .map(|(_, confidence)| *confidence)
            .unwrap_or(Confidence::IMPARTIAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_endpoints() {
        let mut layer = Contracted::default();
        layer.insert(vec![0, 3, 7], Confidence(7.0, 7.0));
        layer.insert(vec![1, 7], Confidence(5.0, 6.0));
        assert_eq!(layer.confidence(0, 7), Confidence(7.0, 7.0));
        assert_eq!(layer.confidence(1, 7), Confidence(5.0, 6.0));
        assert_eq!(layer.confidence(0, 5), Confidence::IMPARTIAL);
    }

    #[test]
    fn first_inserted_path_wins_its_endpoints() {
        let mut layer = Contracted::default();
        layer.insert(vec![0, 3, 7], Confidence(7.0, 7.0));
        layer.insert(vec![0, 5, 7], Confidence(5.0, 7.0));
        assert_eq!(layer.confidence(0, 7), Confidence(7.0, 7.0));
        assert_eq!(layer.paths().count(), 1);
    }
}
