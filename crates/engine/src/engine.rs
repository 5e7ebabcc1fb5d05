//! The OLRT partition-refinement engine.
//!
//! Grounded on `OLRTAlgorithm` in `explicit_lts_sim.cc`: `init` builds the
//! per-block counters and seeds the work queue by scanning every
//! transition once; `run` drains the queue via `process_remove` until
//! fixpoint.

use ltssim_core::{
    build_delta, BinaryRelation, BlockId, CounterContext, CounterTable, Delta, LabelId, Lts,
    SmartSet, StateId,
};

use crate::config::{EngineConfig, WorkQueue};
use crate::partition::Partition;

/// A running instance of the refinement engine, scoped to one `&Lts` and
/// one computation. Not `Sync`: the engine is always driven by a single
/// thread.
pub struct SimEngine<'a, L: Lts> {
    lts: &'a L,
    partition: Partition,
    relation: BinaryRelation,
    ctx: CounterContext,
    queue: WorkQueue,
    remove_cache: Vec<Vec<StateId>>,
    config: EngineConfig,
}

impl<'a, L: Lts> SimEngine<'a, L> {
    /// Construct the engine with a single enveloping block (id 0)
    /// containing every state. Callers seeding an initial partition call
    /// [`SimEngine::make_block`] some number of times before [`SimEngine::init`];
    /// callers wanting the flat (unseeded) variant call `init` directly.
    pub fn new(lts: &'a L, config: EngineConfig) -> Self {
        let labels = lts.labels();
        let states = lts.states();

        let mut partition = Partition::new(states);
        if states > 0 {
            let mut inset = SmartSet::new(labels);
            for q in 0..states {
                for &a in lts.bw_labels(StateId::from(q)) {
                    inset.add(a.0);
                }
            }
            let head = partition.whole_ring();
            partition.new_block(head, CounterTable::new(labels), inset, vec![None; labels]);
        }

        SimEngine {
            lts,
            partition,
            relation: BinaryRelation::new(0, false),
            ctx: CounterContext::build(&[], states),
            queue: WorkQueue::new(config.queue_discipline),
            remove_cache: Vec::new(),
            config,
        }
    }

    /// Number of blocks in the current partition.
    pub fn block_count(&self) -> usize {
        self.partition.len()
    }

    /// Seed the initial partition with an arbitrary named block, moving
    /// `states` out of whatever block currently holds them.
    /// `block_id` must equal the next free partition index.
    pub fn make_block(&mut self, states: &[StateId], block_id: BlockId) {
        debug_assert!(!states.is_empty(), "make_block requires a non-empty state set");
        debug_assert_eq!(
            block_id.index(),
            self.partition.len(),
            "make_block id must equal the next partition index"
        );

        let labels = self.lts.labels();
        let sources: Vec<BlockId> = states.iter().map(|&q| self.partition.block_of(q)).collect();
        let head = self.partition.detach_states(states);
        self.partition.adopt_ring(head, block_id);

        let mut inset = SmartSet::new(labels);
        for (&q, &src) in states.iter().zip(sources.iter()) {
            for &a in self.lts.bw_labels(q) {
                self.partition.blocks[src.index()].inset.remove_strict(a.0);
                inset.add(a.0);
            }
        }

        self.partition
            .new_block(head, CounterTable::new(labels), inset, vec![None; labels]);
    }

    /// Install `initial_relation` as the block-level quotient, build the
    /// per-(block, label) counters, and seed the work queue.
    pub fn init(&mut self, initial_relation: BinaryRelation) {
        debug_assert_eq!(
            self.partition.len(),
            initial_relation.size(),
            "initial relation must be sized to the seeded partition"
        );
        #[cfg(debug_assertions)]
        for i in 0..initial_relation.size() {
            debug_assert!(initial_relation.get(i, i), "initial relation must be reflexive");
        }

        self.relation = initial_relation;
        self.init_inner();
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn init_inner(&mut self) {
        let states = self.lts.states();
        let labels = self.lts.labels();
        let delta = build_delta(self.lts);
        self.ctx = CounterContext::from_delta(&delta, states);

        for a in 0..labels {
            let targets: Vec<StateId> = delta.delta1[a].iter().map(StateId::from).collect();
            self.fast_split(&targets);
        }

        self.clear_unmatchable_pairs(&delta);
        self.seed_counters_and_removals(&delta);
        self.partition.release_all_singletons();

        tracing::debug!(
            blocks = self.partition.len(),
            queued = self.queue.len(),
            "init complete"
        );
    }

    /// For every block pair `(B1, B2)` where `B1` has an incoming edge on
    /// some label `a` and `B2` has none, clear `R[B1][B2]`: `B1` has an
    /// `a`-edge `B2` can never match.
    fn clear_unmatchable_pairs(&mut self, delta: &Delta) {
        let n = self.partition.len();
        let labels = self.lts.labels();
        let mut pre: Vec<Vec<LabelId>> = vec![Vec::new(); n];
        let mut no_pre: Vec<Vec<BlockId>> = vec![Vec::new(); labels];

        for b in 0..n {
            let block_id = BlockId::from(b);
            for q in self.partition.store_states(block_id) {
                for a in 0..labels {
                    if delta.delta1[a].contains(q.0) {
                        pre[b].push(LabelId::from(a));
                    } else {
                        no_pre[a].push(block_id);
                    }
                }
            }
        }

        for b1 in 0..n {
            for &a in &pre[b1] {
                for &b2 in &no_pre[a.index()] {
                    self.relation.set(b1, b2.index(), false);
                }
            }
        }
    }

    /// Build every block's initial counters and `remove[a]` bags. Blocks are
    /// visited in reverse creation order, matching the original.
    fn seed_counters_and_removals(&mut self, delta: &Delta) {
        let n = self.partition.len();
        let states = self.lts.states();

        for b in (0..n).rev() {
            let block_id = BlockId::from(b);
            let inset_labels: Vec<u32> = self.partition.blocks[b].inset.iter().collect();

            for a in inset_labels {
                let label = LabelId::from(a);

                for q in delta.delta1[a as usize].iter() {
                    for &r in self.lts.post(label, StateId::from(q)) {
                        let r_block = self.partition.block_of(r);
                        if self.relation.get(b, r_block.index()) {
                            self.partition.blocks[b].counter.incr(&self.ctx, label, q, 1);
                        }
                    }
                }

                let mut s = SmartSet::new(states);
                s.assign_flat(delta.delta1[a as usize].iter());

                for b2 in 0..n {
                    if !self.relation.get(b, b2) {
                        continue;
                    }
                    for q2 in self.partition.store_states(BlockId::from(b2)) {
                        for &p in self.lts.pre(label, q2) {
                            s.remove(p.0);
                        }
                    }
                }

                if s.is_empty() {
                    continue;
                }

                let list = self.rc_alloc_from(s.iter().map(StateId::from));
                self.partition.blocks[b].remove[label.index()] = Some(list);
                self.queue.push((block_id, label));
            }
        }
    }

    /// Drain the work queue, calling [`SimEngine::process_remove`] for
    /// every pair until none remain.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run(&mut self) {
        let mut pops = 0usize;
        while let Some((block, label)) = self.queue.pop() {
            pops += 1;
            tracing::trace!(?block, ?label, "processing remove");
            self.process_remove(block, label);
        }
        tracing::debug!(pops, blocks = self.partition.len(), "run complete");
    }

    /// Like [`SimEngine::run`], but stops after at most `max_pops` queue
    /// pops, returning `false` if the queue was not drained. The partition
    /// and relation are left in a structurally valid (if not yet
    /// fixpointed) state either way; callers that get `false` back should
    /// not treat the current relation as the simulation preorder.
    pub fn run_bounded(&mut self, max_pops: usize) -> bool {
        let mut pops = 0usize;
        while pops < max_pops {
            let Some((block, label)) = self.queue.pop() else {
                return true;
            };
            self.process_remove(block, label);
            pops += 1;
        }
        self.queue.pop().is_none()
    }

    /// Project the final block-level relation back onto individual states
    /// (`buildResult` in the original algorithm).
    pub fn build_result(&self, output_size: usize) -> BinaryRelation {
        let mut out = BinaryRelation::new(output_size, false);
        for i in 0..output_size {
            let bi = self.partition.block_of(StateId::from(i)).index();
            for j in 0..output_size {
                let bj = self.partition.block_of(StateId::from(j)).index();
                out.set(i, j, self.relation.get(bi, bj));
            }
        }
        out
    }

    /// The engine's active configuration, for callers inspecting how it
    /// was set up.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    // ---- internal refinement machinery ----

    fn internal_split(&mut self, remove: &[StateId]) -> Vec<BlockId> {
        let mut mask = vec![false; self.partition.len()];
        let mut modified = Vec::new();
        for &q in remove {
            let block = self.partition.block_of(q);
            self.partition.move_to_tmp(q);
            if !mask[block.index()] {
                mask[block.index()] = true;
                modified.push(block);
            }
        }
        modified
    }

    /// Split every block touched by `remove` into "states in `remove`" vs
    /// the rest, without bothering to repartition pending `remove` bags —
    /// used only during `init`, since counters (and thus `remove` bags)
    /// are rebuilt from scratch right after.
    fn fast_split(&mut self, remove: &[StateId]) {
        let modified = self.internal_split(remove);
        for block in modified {
            if self.partition.check_empty(block) {
                continue;
            }
            self.spawn_child(block);
        }
    }

    /// Split every block touched by `remove`, returning the blocks that no
    /// longer simulate the states in `remove` — either an existing block
    /// that was wholly moved, or a freshly spawned child that inherits the
    /// parent's counters (copy-on-write) and its share of any pending
    /// removals.
    fn split(&mut self, remove: &[StateId]) -> Vec<BlockId> {
        let modified = self.internal_split(remove);
        let mut remove_list = Vec::new();

        for block in modified {
            if self.partition.check_empty(block) {
                remove_list.push(block);
                continue;
            }

            let new_id = self.spawn_child(block);
            remove_list.push(new_id);
            self.share_counters(block, new_id);
            self.repartition_pending_removals(block, new_id);
        }

        remove_list
    }

    /// Share `child`'s inset-label counter rows with `parent`'s via
    /// copy-on-write.
    fn share_counters(&mut self, parent: BlockId, child: BlockId) {
        let (parent_blk, child_blk) = self.partition.two_blocks_mut(parent, child);
        let child_inset = child_blk.inset.clone();
        child_blk.counter.copy_labels(&child_inset, &parent_blk.counter);
    }

    /// Any `remove[a]` bag still pending on `parent` may contain states
    /// that just moved to `child`; split each such bag by current block
    /// membership so neither side loses or duplicates a pending removal.
    fn repartition_pending_removals(&mut self, parent: BlockId, child: BlockId) {
        let labels = self.lts.labels();
        for a in 0..labels {
            let label = LabelId::from(a);
            let Some(list) = self.partition.blocks[parent.index()].remove[label.index()].take() else {
                continue;
            };

            let mut parent_list = self.rc_alloc_from(std::iter::empty());
            let mut child_list = self.rc_alloc_from(std::iter::empty());
            for q in list {
                if self.partition.block_of(q) == child {
                    child_list.push(q);
                } else {
                    parent_list.push(q);
                }
            }

            if parent_list.is_empty() {
                self.rc_free(parent_list);
            } else {
                self.partition.blocks[parent.index()].remove[label.index()] = Some(parent_list);
            }

            if child_list.is_empty() {
                self.rc_free(child_list);
            } else {
                self.partition.blocks[child.index()].remove[label.index()] = Some(child_list);
                self.queue.push((child, label));
            }
        }
    }

    /// Detach the moved-out (`tmp`) ring of `parent` into a freshly minted
    /// child block, transferring the relevant `inset` labels from parent
    /// to child (`OLRTBlock(index, parent, lts)` in the original algorithm).
    fn spawn_child(&mut self, parent: BlockId) -> BlockId {
        let new_id = BlockId::from(self.relation.split(parent.index(), true));
        let head = self
            .partition
            .take_tmp(parent)
            .expect("spawn_child requires a non-empty tmp ring");
        let moved = self.partition.adopt_ring(Some(head), new_id);

        let labels = self.lts.labels();
        let mut child_inset = SmartSet::new(labels);
        for &q in &moved {
            for &a in self.lts.bw_labels(q) {
                self.partition.blocks[parent.index()].inset.remove_strict(a.0);
                child_inset.add(a.0);
            }
        }

        self.partition
            .new_block(Some(head), CounterTable::new(labels), child_inset, vec![None; labels]);

        new_id
    }

    /// Split `block.remove[label]` out of every block it touches, then
    /// clear the quotient relation and decrement predecessor counters
    /// accordingly.
    fn process_remove(&mut self, block: BlockId, label: LabelId) {
        // Snapshot every state currently in `block` (not just the ones about
        // to be removed) before the split below moves any of them into a
        // child: the predecessor search below must cover all of `block`'s
        // states, since a state `block` retains can still have a
        // predecessor whose relation cell needs clearing against whatever
        // `remove`'s states end up in.
        let snapshot = self.partition.store_states(block);

        let remove = self.partition.blocks[block.index()].remove[label.index()]
            .take()
            .expect("queued (block, label) must have a pending remove list");
        let remove_list = self.split(&remove);
        self.rc_free(remove);

        let mut b1_mask = vec![false; self.partition.len()];

        for &q in &snapshot {
            let preds: Vec<StateId> = self.lts.pre(label, q).to_vec();
            for p in preds {
                let b1 = self.partition.block_of(p);
                if b1_mask[b1.index()] {
                    continue;
                }
                b1_mask[b1.index()] = true;

                for &b2 in &remove_list {
                    // `b1` can never be one of the blocks split off of
                    // `block` by this very call: predecessors were
                    // collected over `snapshot`, taken before the split.
                    debug_assert_ne!(b1.index(), b2.index());
                    if !self.relation.get(b1.index(), b2.index()) {
                        continue;
                    }
                    self.relation.set(b1.index(), b2.index(), false);
                    self.decrement_via(b1, b2);
                }
            }
        }
    }

    /// For every label shared between `b1`'s and `b2`'s insets, decrement
    /// `b1`'s counters for every predecessor of every state in `b2`; any
    /// counter that hits zero enqueues its state into `b1.remove[label]`
    /// Each visited predecessor is a distinct edge — multi-edges each cause
    /// their own decrement.
    fn decrement_via(&mut self, b1: BlockId, b2: BlockId) {
        let shared_labels: Vec<u32> = {
            let b2_blk = &self.partition.blocks[b2.index()];
            let b1_blk = &self.partition.blocks[b1.index()];
            b2_blk.inset.iter().filter(|&a| b1_blk.inset.contains(a)).collect()
        };
        let b2_states = self.partition.store_states(b2);

        for a in shared_labels {
            let label = LabelId::from(a);
            for &q2 in &b2_states {
                let preds: Vec<StateId> = self.lts.pre(label, q2).to_vec();
                for p2 in preds {
                    let new_value = self.partition.blocks[b1.index()].counter.decr(&self.ctx, label, p2.0);
                    if new_value != 0 {
                        continue;
                    }
                    let b1_blk = &mut self.partition.blocks[b1.index()];
                    if b1_blk.remove[label.index()].is_none() {
                        b1_blk.remove[label.index()] = Some(self.remove_cache.pop().unwrap_or_default());
                        self.queue.push((b1, label));
                    }
                    self.partition.blocks[b1.index()].remove[label.index()]
                        .as_mut()
                        .unwrap()
                        .push(p2);
                }
            }
        }
    }

    fn rc_alloc_from(&mut self, items: impl Iterator<Item = StateId>) -> Vec<StateId> {
        let mut v = self.remove_cache.pop().unwrap_or_default();
        v.clear();
        v.extend(items);
        v
    }

    fn rc_free(&mut self, mut v: Vec<StateId>) {
        v.clear();
        self.remove_cache.push(v);
    }
}
