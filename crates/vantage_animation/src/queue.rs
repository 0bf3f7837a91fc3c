//! Transition queue
//!
//! Ordered ring buffer of pending camera movements. The front entry is the
//! start of the segment currently being played and the second entry its
//! goal, so the queue holds at least two entries while anything animates.

use crate::movement::CameraMovement;
use std::collections::VecDeque;
use vantage_core::ViewPose;

/// Initial number of movements the queue can hold
pub const DEFAULT_CAPACITY: usize = 100;
/// Number of slots added each time the queue fills up
pub const DEFAULT_GROWTH: usize = 20;

/// The (start, goal) pair being interpolated
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: CameraMovement,
    pub goal: CameraMovement,
}

/// Growable ring buffer of camera movements
///
/// Capacity grows by a fixed step when full and never shrinks.
#[derive(Clone, Debug)]
pub struct TransitionQueue {
    movements: VecDeque<CameraMovement>,
    capacity: usize,
    growth: usize,
}

impl TransitionQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_GROWTH)
    }

    pub fn with_capacity(capacity: usize, growth: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            movements: VecDeque::with_capacity(capacity),
            capacity,
            growth: growth.max(1),
        }
    }

    /// Append a movement
    ///
    /// When the queue is empty a "you are here" snapshot of `live` is pushed
    /// first so the new movement has a defined start. Returns `true` in that
    /// case, which tells the caller to anchor its clock.
    pub fn enqueue(&mut self, movement: CameraMovement, live: &ViewPose) -> bool {
        let started = self.movements.is_empty();
        if started {
            self.push(CameraMovement::snapshot(*live));
        }
        self.push(movement);
        started
    }

    fn push(&mut self, movement: CameraMovement) {
        if self.movements.len() >= self.capacity {
            self.capacity += self.growth;
            self.movements.reserve(self.capacity - self.movements.len());
            tracing::trace!("TransitionQueue: grew to {} slots", self.capacity);
        }
        self.movements.push_back(movement);
    }

    /// The segment currently being played, copied out as one unit
    pub fn front_segment(&self) -> Option<Segment> {
        match (self.movements.front(), self.movements.get(1)) {
            (Some(start), Some(goal)) => Some(Segment {
                start: *start,
                goal: *goal,
            }),
            _ => None,
        }
    }

    /// Pop the start of the finished segment; its goal becomes the next start
    pub fn advance(&mut self) -> Option<CameraMovement> {
        self.movements.pop_front()
    }

    /// Drop every movement
    pub fn clear(&mut self) {
        self.movements.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Whether a (start, goal) segment is available
    pub fn has_next(&self) -> bool {
        self.movements.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &CameraMovement> {
        self.movements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CameraMovement> {
        self.movements.iter_mut()
    }
}

impl Default for TransitionQueue {
    fn default() -> Self {
        Self::new()
    }
}
