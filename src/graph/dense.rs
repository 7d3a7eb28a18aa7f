use super::layer::Layer;
use crate::rank::Confidence;

/// a leaf's layer: one confidence cell per window, spans answered from
/// prefix sums. leaf cells are always finite, so the subtraction is the
/// pairwise-additive inverse of the cell sum.
pub struct Dense {
    prefix: Vec<Confidence>,
}

impl From<Vec<Confidence>> for Dense {
    fn from(cells: Vec<Confidence>) -> Self {
        let mut prefix = Vec::with_capacity(cells.len() + 1);
        let mut acc = Confidence::IMPARTIAL;
        prefix.push(acc);
        for cell in cells {
            acc = acc + cell;
            prefix.push(acc);
        }
        Self { prefix }
    }
}

impl Layer for Dense {
    fn confidence(&self, i: usize, j: usize) -> Confidence {
        if i >= j || j >= self.prefix.len() {
            return Confidence::IMPOSSIBLE;
        }
        Confidence(
            self.prefix[j].0 - self.prefix[i].0,
            self.prefix[j].1 - self.prefix[i].1,
        )
    }
}
