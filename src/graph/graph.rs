use super::contracted::Contracted;
use super::layer::Layer;
use crate::rank::Comparator;
use crate::rank::Confidence;
use crate::search::config::Config;
use crate::track::Window;
use crate::Delta;
use crate::Stamp;

/// one remembered way of reaching a vertex: where we came from, which of
/// the parent's remembered paths we extended, and the accumulated
/// confidence. entries on the start row have no parent.
#[derive(Debug, Clone)]
struct Entry {
    back: Option<(usize, usize)>,
    confidence: Confidence,
}

/// the layered DAG of a sequential node.
///
/// one row of vertices per stage boundary, a vertex per window boundary.
/// an edge from (i, row d) to (j, row d + 1) carries stage d's layer
/// confidence over the span i..j; a path across all rows is one way of
/// carving the data into consecutive stages. the DP keeps the best
/// `max_memory` incoming paths per vertex, pruning steps whose
/// conformity falls under the floor.
pub struct TimeGraph {
    layers: Vec<Box<dyn Layer>>,
    /// vertex count, one more than the window count
    width: usize,
    /// accumulated window durations per vertex
    timetable: Vec<Delta>,
    reference: Stamp,
    comparator: Comparator,
    floor: Confidence,
    max_memory: usize,
    /// row-major [row][vertex] lists of remembered paths
    paths: Vec<Vec<Entry>>,
    computed: bool,
}

impl TimeGraph {
    pub fn new(layers: Vec<Box<dyn Layer>>, windows: &[Window], config: &Config) -> Self {
        let width = windows.len() + 1;
        let mut timetable = Vec::with_capacity(width);
        let mut acc = Delta::zero();
        timetable.push(acc);
        for window in windows {
            acc += window.duration;
            timetable.push(acc);
        }
        let reference = windows.first().map(|w| w.start).unwrap_or_default();
        Self {
            width,
            timetable,
            reference,
            comparator: config.comparator(),
            floor: config.floor(),
            max_memory: config.max_memory,
            paths: vec![Vec::new(); width * (layers.len() + 1)],
            layers,
            computed: false,
        }
    }

    pub fn height(&self) -> usize {
        self.layers.len()
    }

    fn slot(&self, row: usize, vertex: usize) -> usize {
        row * self.width + vertex
    }

    /// fill the backtrack storage row by row. a virtual start connects
    /// to every vertex of row zero with an impartial path.
    fn compute(&mut self) {
        if self.computed {
            return;
        }
        let tight = Comparator::conformity();
        for vertex in 0..self.width {
            let slot = self.slot(0, vertex);
            self.paths[slot].push(Entry {
                back: None,
                confidence: Confidence::IMPARTIAL,
            });
        }
        for depth in 0..self.layers.len() {
            for start in 0..self.width.saturating_sub(1) {
                let sources = self.paths[self.slot(depth, start)].clone();
                if sources.is_empty() {
                    continue;
                }
                for end in (start + 1)..self.width {
                    let step = self.layers[depth].confidence(start, end);
                    if tight.order(&step, &self.floor) == std::cmp::Ordering::Less {
                        continue;
                    }
                    let candidates = sources.iter().enumerate().map(|(index, entry)| Entry {
                        back: Some((start, index)),
                        confidence: entry.confidence + step,
                    });
                    let slot = self.slot(depth + 1, end);
                    let stored = &mut self.paths[slot];
                    stored.extend(candidates);
                    Self::merge(stored, &self.comparator, &self.floor, self.max_memory);
                }
            }
        }
        self.computed = true;
    }

    /// keep the best few incoming paths: stable descending sort (the
    /// earlier-inserted path wins ties), drop anything under the floor,
    /// truncate to the memory bound
    fn merge(stored: &mut Vec<Entry>, comparator: &Comparator, floor: &Confidence, bound: usize) {
        stored.sort_by(|a, b| comparator.order(&b.confidence, &a.confidence));
        stored.retain(|entry| comparator.compare(&entry.confidence, floor) >= 0.0);
        stored.truncate(bound);
    }

    /// walk parent links from a final-row entry back to the start row
    fn backtrack(&self, vertex: usize, index: usize) -> Vec<usize> {
        let mut path = vec![vertex];
        let mut row = self.height();
        let mut entry = &self.paths[self.slot(row, vertex)][index];
        while let Some((parent, slot)) = entry.back {
            path.push(parent);
            row -= 1;
            entry = &self.paths[self.slot(row, parent)][slot];
        }
        path.reverse();
        path
    }

    /// contract the computed graph into a reusable layer of best paths
    pub fn contracted(&mut self) -> Contracted {
        self.compute();
        let mut contracted = Contracted::default();
        for vertex in 0..self.width {
            let entries = &self.paths[self.slot(self.height(), vertex)];
            for (index, entry) in entries.iter().enumerate() {
                contracted.insert(self.backtrack(vertex, index), entry.confidence);
            }
        }
        contracted
    }

    /// the ranked best stage timetables: each path's vertices resolved
    /// to timestamps, best first
    pub fn best_paths(&mut self, limit: usize) -> Vec<(Vec<Stamp>, Confidence)> {
        let contracted = self.contracted();
        let mut ranked = contracted
            .paths()
            .map(|(path, confidence)| (self.stamps(path), *confidence))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| self.comparator.order(&b.1, &a.1));
        ranked.truncate(limit);
        ranked
    }

    fn stamps(&self, path: &[usize]) -> Vec<Stamp> {
        path.iter()
            .map(|vertex| self.reference + self.timetable[*vertex])
            .collect()
    }
}
