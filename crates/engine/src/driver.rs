//! Public entry points for computing a simulation preorder.
//!
//! Two-tier contract convention: a total, panic-on-misuse fast path for the
//! common case, and a validating entry point that turns caller-contract
//! violations into a `Result` rather than a panic.

use ltssim_core::{BinaryRelation, BlockId, Lts, SimError, SimResult, StateId};

use crate::config::EngineConfig;
use crate::engine::SimEngine;

/// Compute the simulation preorder of `lts`, starting from the coarsest
/// possible partition (every state in one block). Returns an
/// `output_size`×`output_size` matrix over states `0..output_size`.
///
/// Total: always succeeds. `output_size` must be at most `lts.states()` —
/// violating that is a programmer error (panics), not a reportable one.
pub fn compute_simulation(lts: &impl Lts, output_size: usize) -> BinaryRelation {
    debug_assert!(
        output_size <= lts.states(),
        "output_size must not exceed the LTS's state count"
    );

    let mut engine = SimEngine::new(lts, EngineConfig::default());
    let relation = BinaryRelation::new(engine.block_count(), true);
    engine.init(relation);
    engine.run();
    engine.build_result(output_size)
}

/// Like [`compute_simulation`], but stops after at most `max_pops` queue
/// pops. Returns `None` if the budget was exhausted before reaching
/// fixpoint — never a silently-incomplete relation.
pub fn compute_simulation_bounded(lts: &impl Lts, output_size: usize, max_pops: usize) -> Option<BinaryRelation> {
    debug_assert!(output_size <= lts.states());

    let mut engine = SimEngine::new(lts, EngineConfig::default());
    let relation = BinaryRelation::new(engine.block_count(), true);
    engine.init(relation);
    if engine.run_bounded(max_pops) {
        Some(engine.build_result(output_size))
    } else {
        None
    }
}

/// Compute the simulation preorder starting from a caller-supplied initial
/// partition. Blocks are numbered in construction order: block 0 is the
/// envelope (every state not otherwise claimed), block 1 (if
/// `final_states` is non-empty) holds `final_states`, and each subsequent
/// block holds one group from `partition`, in order. `initial_relation`
/// must be reflexive and sized to exactly that many blocks — including
/// the envelope block even when every state ends up claimed by
/// `final_states`/`partition` and the envelope is left empty.
///
/// Validates the caller contract and returns `Err` rather than panicking on
/// a malformed partition.
pub fn compute_simulation_seeded(
    lts: &impl Lts,
    output_size: usize,
    partition: &[Vec<StateId>],
    final_states: &[StateId],
    initial_relation: BinaryRelation,
) -> SimResult<BinaryRelation> {
    let states = lts.states();
    if output_size > states {
        return Err(SimError::OutputSizeExceedsStates { output_size, states });
    }
    validate_partition_contract(states, partition, final_states)?;

    let mut engine = SimEngine::new(lts, EngineConfig::default());

    // Matches the original driver's block numbering: the envelope is block
    // 0, `final_states` (if any) claims the next id, then each partition
    // group in order.
    if !final_states.is_empty() {
        let id = BlockId::from(engine.block_count());
        engine.make_block(final_states, id);
    }
    for group in partition {
        if group.is_empty() {
            continue;
        }
        let id = BlockId::from(engine.block_count());
        engine.make_block(group, id);
    }

    if engine.block_count() != initial_relation.size() {
        return Err(SimError::InvalidInitialRelation {
            reason: format!(
                "initial relation is sized for {} blocks but the seeded partition has {}",
                initial_relation.size(),
                engine.block_count()
            ),
        });
    }
    for i in 0..initial_relation.size() {
        if !initial_relation.get(i, i) {
            return Err(SimError::InvalidInitialRelation {
                reason: "initial relation must be reflexive".to_string(),
            });
        }
    }

    engine.init(initial_relation);
    engine.run();
    Ok(engine.build_result(output_size))
}

fn validate_partition_contract(states: usize, partition: &[Vec<StateId>], final_states: &[StateId]) -> SimResult<()> {
    let mut seen = vec![false; states];
    let mut mark = |q: StateId| -> SimResult<()> {
        let idx = q.index();
        if idx >= states {
            return Err(SimError::StateOutOfRange { state: q, states });
        }
        if seen[idx] {
            return Err(SimError::PartitionOverlap { state: q });
        }
        seen[idx] = true;
        Ok(())
    };

    for group in partition {
        for &q in group {
            mark(q)?;
        }
    }
    for &q in final_states {
        mark(q)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltssim_core::LabelId;

    struct Chain {
        states: usize,
        pre: Vec<Vec<Vec<StateId>>>,
        post: Vec<Vec<Vec<StateId>>>,
        bw: Vec<Vec<LabelId>>,
    }

    impl Chain {
        // 0 -a-> 1 -a-> 2, plus an isolated state 3 with no edges at all.
        fn new() -> Self {
            let states = 4;
            let mut pre = vec![vec![Vec::new(); states]];
            let mut post = vec![vec![Vec::new(); states]];
            let mut bw = vec![Vec::new(); states];
            post[0][0].push(StateId(1));
            pre[0][1].push(StateId(0));
            post[0][1].push(StateId(2));
            pre[0][2].push(StateId(1));
            bw[1].push(LabelId(0));
            bw[2].push(LabelId(0));
            Chain { states, pre, post, bw }
        }
    }

    impl Lts for Chain {
        fn states(&self) -> usize {
            self.states
        }
        fn labels(&self) -> usize {
            1
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
    fn chain_simulation_is_reflexive_and_respects_edges() {
        let lts = Chain::new();
        let rel = compute_simulation(&lts, 4);
        for i in 0..4 {
            assert!(rel.get(i, i));
        }
        // State 3 has no transitions at all, so it simulates (and is
        // simulated by) every other state that also eventually reaches a
        // state with no outgoing edges... in this chain only state 2 is a
        // dead end, so 2 and 3 must simulate each other.
        assert!(rel.get(2, 3));
        assert!(rel.get(3, 2));
    }

    #[test]
    fn seeded_entry_point_rejects_overlapping_partition() {
        let lts = Chain::new();
        let partition = vec![vec![StateId(0), StateId(1)], vec![StateId(1)]];
        let err = compute_simulation_seeded(&lts, 4, &partition, &[], BinaryRelation::new(1, true)).unwrap_err();
        assert_eq!(err, SimError::PartitionOverlap { state: StateId(1) });
    }

    #[test]
    fn seeded_entry_point_rejects_out_of_range_state() {
        let lts = Chain::new();
        let partition = vec![vec![StateId(99)]];
        let err = compute_simulation_seeded(&lts, 4, &partition, &[], BinaryRelation::new(1, true)).unwrap_err();
        assert_eq!(err, SimError::StateOutOfRange { state: StateId(99), states: 4 });
    }

    #[test]
    fn seeded_entry_point_rejects_output_size_too_large() {
        let lts = Chain::new();
        let err = compute_simulation_seeded(&lts, 10, &[], &[], BinaryRelation::new(1, true)).unwrap_err();
        assert_eq!(err, SimError::OutputSizeExceedsStates { output_size: 10, states: 4 });
    }

    #[test]
    fn compute_simulation_bounded_with_ample_budget_matches_unbounded() {
        let lts = Chain::new();
        let unbounded = compute_simulation(&lts, 4);
        let bounded = compute_simulation_bounded(&lts, 4, 1_000_000).expect("ample budget must finish");
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(unbounded.get(i, j), bounded.get(i, j));
            }
        }
    }
}
