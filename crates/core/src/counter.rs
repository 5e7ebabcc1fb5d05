//! Per-block, per-label edge counters with copy-on-write row sharing.
//!
//! Grounded on two pieces of the original `libvata` simulation algorithm:
//! the per-label keyed addressing of the plain `Counter` class in
//! `explicit_lts_sim.cc` (`key[a][q]`, `range[a]`), and the master/shared-array
//! copy-on-write row representation of `shared_counter.hh`. A row either
//! lives entirely in a scalar `master` (every column collapsed to the same
//! value) or in an `Rc`-shared `Vec<u32>` of per-column counts, with `master`
//! always equal to the sum over that array's columns. `Rc`'s own strong
//! count *is* the reference count `shared_counter.hh` tracked by hand — no
//! separate free-list allocator is needed in safe Rust.

use crate::ids::LabelId;
use crate::lts::Delta;
use crate::smart_set::SmartSet;
use std::rc::Rc;
use std::cell::RefCell;

/// Addressing scheme shared read-only by every block's [`CounterTable`]:
/// for each label `a`, a compact column index for every state with an
/// incoming `a`-edge (`key[a][q]`), and the number of such states
/// (`range[a]`).
pub struct CounterContext {
    key: Vec<Vec<u32>>,
    range: Vec<u32>,
}

impl CounterContext {
    /// Build the addressing scheme from `delta1` (one [`SmartSet`] of
    /// incoming-edge targets per label), over a universe of `states` states.
    pub fn build(delta1: &[SmartSet], states: usize) -> Self {
        let mut key = vec![vec![0u32; states]; delta1.len()];
        let mut range = vec![0u32; delta1.len()];
        for (a, targets) in delta1.iter().enumerate() {
            let mut x = 0u32;
            for q in targets.iter() {
                key[a][q as usize] = x;
                x += 1;
            }
            range[a] = x;
        }
        CounterContext { key, range }
    }

    /// Convenience constructor straight from a [`Delta`].
    pub fn from_delta(delta: &Delta, states: usize) -> Self {
        Self::build(&delta.delta1, states)
    }

    #[inline]
    fn col(&self, label: LabelId, state: u32) -> usize {
        self.key[label.index()][state as usize] as usize
    }

    #[inline]
    fn row_size(&self, label: LabelId) -> usize {
        self.range[label.index()] as usize
    }
}

#[derive(Clone, Default)]
struct Row {
    master: u32,
    shared: Option<Rc<RefCell<Vec<u32>>>>,
}

/// Per-label edge counters for a single block.
///
/// `get(a, q)` is the number of `a`-successors of `q` currently believed to
/// lie in a simulator block of this block.
#[derive(Clone, Default)]
pub struct CounterTable {
    rows: Vec<Row>,
}

impl CounterTable {
    /// An empty table over `labels` labels; every counter starts at 0.
    pub fn new(labels: usize) -> Self {
        CounterTable {
            rows: vec![Row::default(); labels],
        }
    }

    /// Current value of counter `(label, state)`.
    pub fn get(&self, ctx: &CounterContext, label: LabelId, state: u32) -> u32 {
        let row = &self.rows[label.index()];
        match &row.shared {
            Some(arr) => arr.borrow()[ctx.col(label, state)],
            None => row.master,
        }
    }

    /// Increase counter `(label, state)` by `count`. Only valid before the
    /// row has collapsed to scalar form via [`CounterTable::release_singletons`]
    /// or a [`CounterTable::decr`] that emptied it — i.e. only during `init`,
    /// matching the original algorithm's usage.
    pub fn incr(&mut self, ctx: &CounterContext, label: LabelId, state: u32, count: u32) {
        let col = ctx.col(label, state);
        let row = &mut self.rows[label.index()];

        if let Some(arr) = &row.shared {
            row.master += count;
            arr.borrow_mut()[col] += count;
            return;
        }

        debug_assert_eq!(row.master, 0, "incr on a row that already collapsed to scalar");
        let mut data = vec![0u32; ctx.row_size(label)];
        data[col] = count;
        row.master = count;
        row.shared = Some(Rc::new(RefCell::new(data)));
    }

    /// Decrease counter `(label, state)` by 1, cloning the shared array
    /// first if another block's table still references it (copy-on-write),
    /// and collapsing back to scalar form if the row's remaining mass now
    /// lives in a single column (or in `master` itself). Returns the new
    /// value.
    pub fn decr(&mut self, ctx: &CounterContext, label: LabelId, state: u32) -> u32 {
        let col = ctx.col(label, state);
        let row = &mut self.rows[label.index()];

        let arr = match &row.shared {
            None => {
                debug_assert!(row.master > 0, "decr on an already-zero scalar row");
                row.master -= 1;
                return row.master;
            }
            Some(arr) => Rc::clone(arr),
        };

        let col_val = arr.borrow()[col];

        if row.master == col_val || row.master == 2 {
            // Everything left in this row is in this column (or there's at
            // most one unit left in total): collapse to scalar.
            row.master -= 1;
            let result = col_val - 1;
            row.shared = None;
            return result;
        }

        // `arr` is a second handle to the same `Rc` on top of the one
        // `row.shared` already holds, so exclusive ownership is
        // `strong_count == 2`, not `1` — only clone the backing array once
        // a *third* handle (another block's table) is also live.
        if Rc::strong_count(&arr) > 2 {
            let cloned = arr.borrow().clone();
            row.shared = Some(Rc::new(RefCell::new(cloned)));
        }

        row.master -= 1;
        let mut data = row.shared.as_ref().unwrap().borrow_mut();
        data[col] -= 1;
        data[col]
    }

    /// Share rows for the given `labels` from `src` by cloning the `Rc`
    /// (incrementing its strong count) rather than the underlying array.
    /// Used when a block is split: the child initially shares rows with
    /// the parent.
    pub fn copy_labels(&mut self, labels: &SmartSet, src: &CounterTable) {
        for a in labels.iter() {
            self.rows[a as usize] = src.rows[a as usize].clone();
        }
    }

    /// After `init` finishes incrementing counters, collapse every row
    /// whose only non-zero column equals `master` to scalar-only form, so
    /// later splits don't needlessly copy-on-write rows that never needed
    /// per-column resolution.
    pub fn release_singletons(&mut self) {
        for row in &mut self.rows {
            let Some(arr) = &row.shared else { continue };
            let collapses = {
                let data = arr.borrow();
                match data.iter().position(|&v| v != 0) {
                    Some(col) => data[col] == row.master,
                    None => true,
                }
            };
            if collapses {
                row.shared = None;
            }
        }
    }
}
