use crate::rank::Confidence;

/// the confidence matrix of one behavior node, read lazily.
///
/// indices are window boundaries: with W windows there are W + 1
/// vertices, and `confidence(i, j)` scores the span covering windows
/// i..j. layers compose: logical and restricting nodes wrap their
/// children's layers, sequential nodes contract a whole time graph
/// back into a layer.
pub trait Layer {
    fn confidence(&self, i: usize, j: usize) -> Confidence;
}
