// src/event/queue.rs

use std::collections::VecDeque;

use super::Event;

/// Ordered buffer of events awaiting processing.
///
/// Semantics:
/// - `push(event, false)` appends at the tail (FIFO).
/// - `push(event, true)` inserts at the head; the engine only does this for
///   preemptive events, so they are dequeued before anything still waiting.
/// - Nothing here is synchronised. The engine keeps the queue behind its own
///   lock together with the shutdown flag and dispatch state.
#[derive(Debug)]
pub struct EventQueue<P> {
    items: VecDeque<Event<P>>,
}

impl<P> EventQueue<P> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: Event<P>, at_front: bool) {
        if at_front {
            self.items.push_front(event);
        } else {
            self.items.push_back(event);
        }
    }

    pub fn pop_next(&mut self) -> Option<Event<P>> {
        self.items.pop_front()
    }

    pub fn peek_next(&self) -> Option<&Event<P>> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Drop everything; returns how many events were discarded.
    pub fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event<P>> {
        self.items.iter()
    }
}

impl<P> Default for EventQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(q: &mut EventQueue<()>) -> Vec<u32> {
        std::iter::from_fn(|| q.pop_next()).map(|e| e.kind()).collect()
    }

    #[test]
    fn tail_pushes_are_fifo() {
        let mut q = EventQueue::new();
        for k in 1..=4 {
            q.push(Event::new(k), false);
        }
        assert_eq!(kinds(&mut q), vec![1, 2, 3, 4]);
    }

    #[test]
    fn head_push_jumps_the_line() {
        let mut q = EventQueue::new();
        q.push(Event::new(1), false);
        q.push(Event::new(2), true);
        q.push(Event::new(3), false);
        assert_eq!(kinds(&mut q), vec![2, 1, 3]);
    }

    #[test]
    fn peek_does_not_remove() {
        let mut q = EventQueue::new();
        q.push(Event::<()>::new(9), false);
        assert_eq!(q.peek_next().map(|e| e.kind()), Some(9));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn clear_reports_discarded_count() {
        let mut q = EventQueue::new();
        q.push(Event::<()>::new(1), false);
        q.push(Event::<()>::new(2), false);
        assert_eq!(q.clear(), 2);
        assert!(q.is_empty());
        assert!(q.pop_next().is_none());
    }
}
