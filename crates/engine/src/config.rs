//! Engine configuration.
//!
//! A small builder-style config object, trimmed to the one knob that
//! actually applies here: the work queue's pop discipline. The original
//! algorithm uses a plain `std::vector` as a LIFO stack; fixpoint
//! correctness is independent of queue order, so a FIFO alternative is
//! offered purely for callers who find breadth-first refinement easier to
//! trace while debugging.

use std::collections::VecDeque;

use ltssim_core::{BlockId, LabelId};

/// Pop order for the `(block, label)` work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueDiscipline {
    /// Most-recently-queued pair first. Matches the original's
    /// `std::vector` used as a stack.
    #[default]
    Lifo,
    /// Oldest-queued pair first.
    Fifo,
}

/// Engine-wide configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub queue_discipline: QueueDiscipline,
}

impl EngineConfig {
    /// Start building a config away from the defaults.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfigBuilder {
    queue_discipline: QueueDiscipline,
}

impl EngineConfigBuilder {
    pub fn queue_discipline(mut self, d: QueueDiscipline) -> Self {
        self.queue_discipline = d;
        self
    }

    pub fn build(self) -> EngineConfig {
        EngineConfig {
            queue_discipline: self.queue_discipline,
        }
    }
}

/// The `(block, label)` work queue driving refinement to fixpoint.
pub(crate) enum WorkQueue {
    Lifo(Vec<(BlockId, LabelId)>),
    Fifo(VecDeque<(BlockId, LabelId)>),
}

impl WorkQueue {
    pub(crate) fn new(discipline: QueueDiscipline) -> Self {
        match discipline {
            QueueDiscipline::Lifo => WorkQueue::Lifo(Vec::new()),
            QueueDiscipline::Fifo => WorkQueue::Fifo(VecDeque::new()),
        }
    }

    pub(crate) fn push(&mut self, item: (BlockId, LabelId)) {
        match self {
            WorkQueue::Lifo(v) => v.push(item),
            WorkQueue::Fifo(v) => v.push_back(item),
        }
    }

    pub(crate) fn pop(&mut self) -> Option<(BlockId, LabelId)> {
        match self {
            WorkQueue::Lifo(v) => v.pop(),
            WorkQueue::Fifo(v) => v.pop_front(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            WorkQueue::Lifo(v) => v.len(),
            WorkQueue::Fifo(v) => v.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_pops_most_recent_first() {
        let mut q = WorkQueue::new(QueueDiscipline::Lifo);
        q.push((BlockId(0), LabelId(0)));
        q.push((BlockId(1), LabelId(0)));
        assert_eq!(q.pop(), Some((BlockId(1), LabelId(0))));
        assert_eq!(q.pop(), Some((BlockId(0), LabelId(0))));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn fifo_pops_oldest_first() {
        let mut q = WorkQueue::new(QueueDiscipline::Fifo);
        q.push((BlockId(0), LabelId(0)));
        q.push((BlockId(1), LabelId(0)));
        assert_eq!(q.pop(), Some((BlockId(0), LabelId(0))));
        assert_eq!(q.pop(), Some((BlockId(1), LabelId(0))));
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn builder_defaults_to_lifo() {
        let cfg = EngineConfig::builder().build();
        assert_eq!(cfg.queue_discipline, QueueDiscipline::Lifo);
    }
}
