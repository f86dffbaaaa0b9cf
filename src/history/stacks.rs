//! Bounded undo stack and unbounded redo stack.

/// A LIFO stack of snapshots, optionally bounded.
///
/// When bounded, pushing past capacity evicts from the oldest end.
#[derive(Clone, Debug)]
pub struct Stack<S> {
    /// Ordered oldest first; the top is the last element.
    entries: Vec<S>,
    capacity: Option<usize>,
}

impl<S> Stack<S> {
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: Some(capacity),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            entries: Vec::new(),
            capacity: None,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Push onto the top. Returns how many entries were evicted.
    pub fn push(&mut self, state: S) -> usize {
        self.entries.push(state);
        match self.capacity {
            Some(cap) if self.entries.len() > cap => {
                let excess = self.entries.len() - cap;
                self.entries.drain(..excess);
                excess
            }
            _ => 0,
        }
    }

    /// Pop the top entry. `None` means the caller skipped its
    /// `can_undo`/`can_redo` check.
    #[must_use]
    pub fn pop(&mut self) -> Option<S> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<&S> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn as_slice(&self) -> &[S] {
        &self.entries
    }
}

/// The undo/redo stack pair.
#[derive(Clone, Debug)]
pub struct UndoRedoStacks<S> {
    pub undo: Stack<S>,
    pub redo: Stack<S>,
}

impl<S> UndoRedoStacks<S> {
    pub fn new(stack_size: usize) -> Self {
        Self {
            undo: Stack::bounded(stack_size),
            redo: Stack::unbounded(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo() {
        let mut stack = Stack::unbounded();
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.top(), Some(&2));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_bounded_evicts_oldest() {
        let mut stack = Stack::bounded(3);
        for i in 0..3 {
            assert_eq!(stack.push(i), 0);
        }
        assert_eq!(stack.push(3), 1);
        assert_eq!(stack.push(4), 1);
        assert_eq!(stack.as_slice(), &[2, 3, 4]);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut stack = Stack::unbounded();
        for i in 0..1000 {
            assert_eq!(stack.push(i), 0);
        }
        assert_eq!(stack.len(), 1000);
        assert_eq!(stack.capacity(), None);
    }

    #[test]
    fn test_pair_flags() {
        let mut stacks = UndoRedoStacks::new(2);
        assert!(!stacks.can_undo());
        assert!(!stacks.can_redo());

        stacks.undo.push("a");
        stacks.redo.push("b");
        assert!(stacks.can_undo());
        assert!(stacks.can_redo());

        stacks.clear();
        assert!(!stacks.can_undo());
        assert!(!stacks.can_redo());
    }
}
