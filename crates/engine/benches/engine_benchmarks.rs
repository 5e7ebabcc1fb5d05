//! Engine microbenchmarks.
//!
//! Targets the hottest internal loop (`process_remove`'s decrement pass)
//! and the end-to-end `run` over chain- and fan-shaped LTSs of increasing
//! size, the two structures most likely to stress either the partition
//! ring machinery or the counter copy-on-write path.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ltssim_core::{LabelId, Lts, StateId};
use ltssim_engine::compute_simulation;

struct ChainLts {
    states: usize,
    pre: Vec<Vec<StateId>>,
    post: Vec<Vec<StateId>>,
    bw: Vec<Vec<LabelId>>,
}

impl ChainLts {
    fn new(states: usize) -> Self {
        let mut pre = vec![Vec::new(); states];
        let mut post = vec![Vec::new(); states];
        let mut bw = vec![Vec::new(); states];
        for q in 1..states {
            pre[q].push(StateId::from(q - 1));
            post[q - 1].push(StateId::from(q));
            bw[q].push(LabelId(0));
        }
        ChainLts { states, pre, post, bw }
    }
}

impl Lts for ChainLts {
    fn states(&self) -> usize {
        self.states
    }
    fn labels(&self) -> usize {
        1
    }
    fn pre(&self, _label: LabelId, state: StateId) -> &[StateId] {
        &self.pre[state.index()]
    }
    fn post(&self, _label: LabelId, state: StateId) -> &[StateId] {
        &self.post[state.index()]
    }
    fn bw_labels(&self, state: StateId) -> &[LabelId] {
        &self.bw[state.index()]
    }
}

/// A fan-out: one root with `states - 1` deadlocked children, all on the
/// same label — exercises many equivalent blocks collapsing together.
struct FanLts {
    states: usize,
    root_post: Vec<StateId>,
    child_pre: Vec<StateId>,
    bw: Vec<Vec<LabelId>>,
}

impl FanLts {
    fn new(states: usize) -> Self {
        let root_post: Vec<StateId> = (1..states).map(StateId::from).collect();
        FanLts {
            states,
            root_post,
            child_pre: vec![StateId(0)],
            bw: (0..states)
                .map(|q| if q == 0 { Vec::new() } else { vec![LabelId(0)] })
                .collect(),
        }
    }
}

impl Lts for FanLts {
    fn states(&self) -> usize {
        self.states
    }
    fn labels(&self) -> usize {
        1
    }
    fn pre(&self, _label: LabelId, state: StateId) -> &[StateId] {
        if state.index() == 0 {
            &[]
        } else {
            &self.child_pre
        }
    }
    fn post(&self, _label: LabelId, state: StateId) -> &[StateId] {
        if state.index() == 0 {
            &self.root_post
        } else {
            &[]
        }
    }
    fn bw_labels(&self, state: StateId) -> &[LabelId] {
        &self.bw[state.index()]
    }
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_simulation/chain");
    for &n in &[8usize, 64, 512] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let lts = ChainLts::new(n);
            b.iter(|| compute_simulation(&lts, n));
        });
    }
    group.finish();
}

fn bench_fan(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_simulation/fan");
    for &n in &[8usize, 64, 512] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let lts = FanLts::new(n);
            b.iter(|| compute_simulation(&lts, n));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chain, bench_fan);
criterion_main!(benches);
