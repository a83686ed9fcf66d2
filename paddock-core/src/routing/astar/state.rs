use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

/// Open set entry ordered by estimated total cost
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) f_score: f64,
    pub(super) node: NodeIndex,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by f-score (reversed from standard Rust BinaryHeap),
        // node index keeps equal scores in a stable order
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
