//! Frame FIFO with occupancy tracking.
//!
//! Both roles own one. The source's queue holds frames waiting to be
//! transmitted; the sink's holds frames received but not yet collected.
//! Occupancy counters are updated on every push and pop so producers can
//! apply their own backpressure without walking the queue.

use std::collections::VecDeque;

use gmii_proto::GmiiFrame;

/// Queue occupancy snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occupancy {
    /// Sum of the lengths of queued frames
    pub bytes: usize,
    /// Number of queued frames
    pub frames: usize,
}

/// FIFO of frames with running byte and frame counters.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    frames: VecDeque<GmiiFrame>,
    occupancy_bytes: usize,
    occupancy_frames: usize,
}

impl FrameQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame at the back.
    pub fn push(&mut self, frame: GmiiFrame) {
        self.occupancy_bytes += frame.len();
        self.occupancy_frames += 1;
        self.frames.push_back(frame);
    }

    /// Remove the oldest frame.
    pub fn pop(&mut self) -> Option<GmiiFrame> {
        let frame = self.frames.pop_front()?;
        self.occupancy_bytes -= frame.len();
        self.occupancy_frames -= 1;
        Some(frame)
    }

    /// Oldest frame, without removing it.
    pub fn peek(&self) -> Option<&GmiiFrame> {
        self.frames.front()
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Current counters.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy { bytes: self.occupancy_bytes, frames: self.occupancy_frames }
    }

    /// Check the running counters against the actual contents.
    ///
    /// O(n); meant for tests and assertions.
    pub fn is_consistent(&self) -> bool {
        let bytes: usize = self.frames.iter().map(GmiiFrame::len).sum();
        bytes == self.occupancy_bytes && self.frames.len() == self.occupancy_frames
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &GmiiFrame> {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn fifo_order_and_counters() {
        let mut queue = FrameQueue::new();
        queue.push(GmiiFrame::new(vec![1u8; 10]));
        queue.push(GmiiFrame::new(vec![2u8; 3]));

        assert_eq!(queue.occupancy(), Occupancy { bytes: 13, frames: 2 });
        assert_eq!(queue.peek().map(GmiiFrame::len), Some(10));

        let first = queue.pop();
        assert_eq!(first.map(|f| f.data[0]), Some(1));
        assert_eq!(queue.occupancy(), Occupancy { bytes: 3, frames: 1 });

        assert!(queue.pop().is_some());
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
        assert_eq!(queue.occupancy(), Occupancy::default());
    }

    #[test]
    fn empty_frames_count_as_frames() {
        let mut queue = FrameQueue::new();
        queue.push(GmiiFrame::default());
        assert_eq!(queue.occupancy(), Occupancy { bytes: 0, frames: 1 });
        assert!(!queue.is_empty());
    }

    #[derive(Debug, Clone)]
    enum QueueOp {
        Push(usize),
        Pop,
    }

    fn queue_op() -> impl Strategy<Value = QueueOp> {
        prop_oneof![
            3 => (0..200usize).prop_map(QueueOp::Push),
            2 => Just(QueueOp::Pop),
        ]
    }

    proptest! {
        /// Counters match contents after any interleaving of push and pop.
        #[test]
        fn prop_counters_track_contents(ops in prop::collection::vec(queue_op(), 0..100)) {
            let mut queue = FrameQueue::new();
            let mut model: VecDeque<usize> = VecDeque::new();

            for op in ops {
                match op {
                    QueueOp::Push(len) => {
                        queue.push(GmiiFrame::new(vec![0u8; len]));
                        model.push_back(len);
                    },
                    QueueOp::Pop => {
                        let got = queue.pop().map(|f| f.len());
                        prop_assert_eq!(got, model.pop_front());
                    },
                }

                prop_assert!(queue.is_consistent());
                prop_assert_eq!(queue.occupancy().frames, model.len());
                prop_assert_eq!(queue.occupancy().bytes, model.iter().sum::<usize>());
            }
        }
    }
}
