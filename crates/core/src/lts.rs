//! The read-only labelled-transition-system interface the engine computes
//! over, and the per-label source/target sets derived from it.

use crate::ids::{LabelId, StateId};
use crate::smart_set::SmartSet;

/// Read-only view of a finite labelled transition system.
///
/// Implementations are expected to be dense and contiguous: states are
/// `0..states()`, labels are `0..labels()`. Violating this is a programmer
/// error, and the engine may panic rather than report it as a recoverable
/// error.
pub trait Lts {
    /// Number of states, `|Q|`.
    fn states(&self) -> usize;

    /// Number of labels, `|Σ|`.
    fn labels(&self) -> usize;

    /// Predecessors of `state` on `label`: all `p` such that `p —label→ state`.
    fn pre(&self, label: LabelId, state: StateId) -> &[StateId];

    /// Successors of `state` on `label`: all `q` such that `state —label→ q`.
    fn post(&self, label: LabelId, state: StateId) -> &[StateId];

    /// Labels `a` such that some edge `—a→ state` exists.
    fn bw_labels(&self, state: StateId) -> &[LabelId];
}

/// Per-label source (`delta`) and target (`delta1`) state sets, derived
/// once from an [`Lts`] via [`build_delta`].
pub struct Delta {
    /// `delta[a]`: states with at least one outgoing `a`-edge.
    pub delta: Vec<SmartSet>,
    /// `delta1[a]`: states with at least one incoming `a`-edge.
    pub delta1: Vec<SmartSet>,
}

/// Scan every transition of `lts` once and bucket sources/targets per label.
pub fn build_delta(lts: &impl Lts) -> Delta {
    let labels = lts.labels();
    let states = lts.states();
    let mut delta: Vec<SmartSet> = (0..labels).map(|_| SmartSet::new(states)).collect();
    let mut delta1: Vec<SmartSet> = (0..labels).map(|_| SmartSet::new(states)).collect();

    for q in 0..states {
        let q = StateId::from(q);
        for &a in lts.bw_labels(q) {
            delta1[a.index()].add(q.0);
            for &p in lts.pre(a, q) {
                delta[a.index()].add(p.0);
            }
        }
    }

    Delta { delta, delta1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        states: usize,
        labels: usize,
        pre: Vec<Vec<Vec<StateId>>>,
        post: Vec<Vec<Vec<StateId>>>,
        bw: Vec<Vec<LabelId>>,
    }

    impl Fixture {
        fn new(states: usize, edges: &[(usize, usize, usize)]) -> Self {
            let labels = edges.iter().map(|(a, _, _)| a + 1).max().unwrap_or(0);
            let mut pre = vec![vec![Vec::new(); states]; labels];
            let mut post = vec![vec![Vec::new(); states]; labels];
            let mut bw = vec![Vec::new(); states];
            for &(a, p, q) in edges {
                post[a][p].push(StateId::from(q));
                pre[a][q].push(StateId::from(p));
                if !bw[q].contains(&LabelId::from(a)) {
                    bw[q].push(LabelId::from(a));
                }
            }
            Fixture {
                states,
                labels,
                pre,
                post,
                bw,
            }
        }
    }

    impl Lts for Fixture {
        fn states(&self) -> usize {
            self.states
        }
        fn labels(&self) -> usize {
            self.labels
        }
        fn pre(&self, label: LabelId, state: StateId) -> &[StateId] {
            &self.pre[label.index()][state.index()]
        }
        fn post(&self, label: LabelId, state: StateId) -> &[StateId] {
            &self.post[label.index()][state.index()]
        }
        fn bw_labels(&self, state: StateId) -> &[LabelId] {
            &self.bw[state.index()]
        }
    }

    #[test]
    fn build_delta_chain() {
        // 0 -a-> 1 -a-> 2
        let lts = Fixture::new(3, &[(0, 0, 1), (0, 1, 2)]);
        let d = build_delta(&lts);
        assert!(d.delta[0].contains(0));
        assert!(d.delta[0].contains(1));
        assert!(!d.delta[0].contains(2));
        assert!(d.delta1[0].contains(1));
        assert!(d.delta1[0].contains(2));
        assert!(!d.delta1[0].contains(0));
    }
}
