//! Intrusive doubly-linked block partition.
//!
//! Grounded on `StateListElem`/`OLRTBlock` in `explicit_lts_sim.cc`. Each
//! state has exactly one arena slot (`StateEntry`), linked into a circular
//! ring belonging to its block's `states` list, or (transiently, during a
//! split) into the block's `tmp` list. Ring neighbours are arena indices
//! (`StateId`), never pointers or `Rc`.

use ltssim_core::{BlockId, CounterTable, LabelId, SmartSet, StateId};

#[derive(Clone, Copy)]
struct StateEntry {
    block: BlockId,
    next: StateId,
    prev: StateId,
}

/// One equivalence class of the current partition.
pub struct Block {
    pub id: BlockId,
    head: Option<StateId>,
    tmp_head: Option<StateId>,
    pub counter: CounterTable,
    /// Labels on which some state of this block has an incoming edge.
    pub inset: SmartSet,
    /// Per-label pending removal bag (`remove[a]`).
    pub remove: Vec<Option<Vec<StateId>>>,
}

/// The partition: a state arena plus the blocks it's currently divided
/// into.
pub struct Partition {
    entries: Vec<StateEntry>,
    pub blocks: Vec<Block>,
}

impl Partition {
    /// An arena over `states` states, with no blocks yet. Callers build the
    /// initial enveloping block (or a seeded partition) via [`Partition::push_block`]
    /// after constructing one full ring with [`Partition::whole_ring`].
    pub fn new(states: usize) -> Self {
        let mut entries = Vec::with_capacity(states);
        for q in 0..states {
            let next = (q + 1) % states;
            let prev = (q + states - 1) % states;
            entries.push(StateEntry {
                block: BlockId(0),
                next: StateId::from(next),
                prev: StateId::from(prev),
            });
        }
        Partition {
            entries,
            blocks: Vec::new(),
        }
    }

    /// Head of a single ring threading through every state `0..states`, in
    /// id order. `None` for the degenerate empty-LTS case.
    pub fn whole_ring(&self) -> Option<StateId> {
        if self.entries.is_empty() {
            None
        } else {
            Some(StateId::from(0usize))
        }
    }

    /// Number of blocks currently in the partition.
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn block_of(&self, q: StateId) -> BlockId {
        self.entries[q.index()].block
    }

    pub fn push_block(&mut self, block: Block) -> BlockId {
        let id = block.id;
        debug_assert_eq!(id.index(), self.blocks.len(), "block id must equal its index");
        self.blocks.push(block);
        id
    }

    /// Construct and append a new block rooted at `head` (its `tmp` ring
    /// starts empty), with the given counter/inset/remove state. Returns
    /// the freshly minted id. Used by the engine both for the initial
    /// enveloping/seeded blocks and for children spawned during a split.
    pub fn new_block(
        &mut self,
        head: Option<StateId>,
        counter: CounterTable,
        inset: SmartSet,
        remove: Vec<Option<Vec<StateId>>>,
    ) -> BlockId {
        let id = BlockId::from(self.blocks.len());
        self.blocks.push(Block {
            id,
            head,
            tmp_head: None,
            counter,
            inset,
            remove,
        });
        id
    }

    /// Unlink `x` from its block's `states` ring and link it into that
    /// block's `tmp` ring.
    pub fn move_to_tmp(&mut self, x: StateId) {
        let block = self.entries[x.index()].block;
        let mut states = self.blocks[block.index()].head.take();
        let mut tmp = self.blocks[block.index()].tmp_head.take();
        Self::move_entry(&mut self.entries, x, &mut states, &mut tmp);
        self.blocks[block.index()].head = states;
        self.blocks[block.index()].tmp_head = tmp;
    }

    /// If `block`'s `states` ring is empty, promote `tmp` into `states`
    /// (the block was wholly moved, no split needed) and return `true`.
    /// Otherwise return `false` and leave both rings untouched.
    pub fn check_empty(&mut self, block: BlockId) -> bool {
        let b = &mut self.blocks[block.index()];
        if b.head.is_some() {
            return false;
        }
        b.head = b.tmp_head.take();
        true
    }

    /// Take `block`'s `tmp` ring, leaving it empty. Only meaningful after
    /// `check_empty` returned `false` (the ring is then guaranteed
    /// non-empty).
    pub fn take_tmp(&mut self, block: BlockId) -> Option<StateId> {
        self.blocks[block.index()].tmp_head.take()
    }

    /// States of `block`'s `states` ring, in ring order.
    pub fn store_states(&self, block: BlockId) -> Vec<StateId> {
        Self::walk(&self.entries, self.blocks[block.index()].head)
    }

    /// Reassign every entry in the ring rooted at `head` to `new_block`,
    /// returning the visited states in ring order.
    pub fn adopt_ring(&mut self, head: Option<StateId>, new_block: BlockId) -> Vec<StateId> {
        let states = Self::walk(&self.entries, head);
        for &q in &states {
            self.entries[q.index()].block = new_block;
        }
        states
    }

    /// Detach `states` (which may currently belong to any number of
    /// different blocks) from their current rings and thread them into one
    /// new standalone ring, in the given order. Each source block's
    /// `states` ring shrinks accordingly (and may become empty).
    ///
    /// Used only by `make_block` to seed an initial partition — unlike
    /// `move_to_tmp`, this bypasses the `tmp`-ring machinery entirely,
    /// since seeding happens before any refinement and has no use for it.
    pub fn detach_states(&mut self, states: &[StateId]) -> Option<StateId> {
        let mut dst = None;
        for &q in states {
            let block = self.entries[q.index()].block;
            let mut src = self.blocks[block.index()].head.take();
            Self::move_entry(&mut self.entries, q, &mut src, &mut dst);
            self.blocks[block.index()].head = src;
        }
        dst
    }

    /// Mutable access to two distinct blocks at once (`lower.index() <
    /// higher.index()` is required — always true for a parent/child pair,
    /// since children are always pushed after their parent).
    pub fn two_blocks_mut(&mut self, lower: BlockId, higher: BlockId) -> (&mut Block, &mut Block) {
        debug_assert!(lower.index() < higher.index());
        let (left, right) = self.blocks.split_at_mut(higher.index());
        (&mut left[lower.index()], &mut right[0])
    }

    /// Collapse every block's counter rows that never needed per-column
    /// resolution, once `init` has finished building them.
    pub fn release_all_singletons(&mut self) {
        for block in &mut self.blocks {
            block.counter.release_singletons();
        }
    }

    fn walk(entries: &[StateEntry], head: Option<StateId>) -> Vec<StateId> {
        let Some(head) = head else { return Vec::new() };
        let mut out = Vec::new();
        let mut cur = head;
        loop {
            out.push(cur);
            cur = entries[cur.index()].next;
            if cur == head {
                break;
            }
        }
        out
    }

    /// Core ring-splice primitive, mirroring `StateListElem::move` exactly:
    /// unlink `x` from the `src` ring (clearing `src` to `None` if `x` was
    /// its only member) and splice `x` onto the end of the `dst` ring
    /// (creating a singleton ring if `dst` was empty).
    fn move_entry(entries: &mut [StateEntry], x: StateId, src: &mut Option<StateId>, dst: &mut Option<StateId>) {
        let (next, prev) = (entries[x.index()].next, entries[x.index()].prev);
        if next == x {
            *src = None;
        } else {
            *src = Some(next);
            entries[next.index()].prev = prev;
            entries[prev.index()].next = next;
        }

        match *dst {
            None => {
                entries[x.index()].next = x;
                entries[x.index()].prev = x;
                *dst = Some(x);
            }
            Some(d) => {
                let dprev = entries[d.index()].prev;
                entries[x.index()].next = d;
                entries[x.index()].prev = dprev;
                entries[d.index()].prev = x;
                entries[dprev.index()].next = x;
            }
        }
    }
}
