/// Linear undo/redo history of full snapshots
///
/// Starts as `[initial]` with the cursor at 0. Recording while the cursor is
/// not at the tail drops every entry after it.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Append a snapshot after the cursor and move to it
    pub fn record(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
    }

    /// Step back; `None` at the first entry
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step forward; `None` at the tail
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Never zero: the initial snapshot is always kept
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Patch every stored snapshot in place, without moving the cursor
    pub(crate) fn update_all(&mut self, mut f: impl FnMut(&mut T)) {
        self.entries.iter_mut().for_each(&mut f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_truncates_redo_branch() {
        let mut h = History::new(0);
        h.record(1);
        h.record(2);
        assert_eq!(h.undo(), Some(&1));
        h.record(3);
        assert_eq!(h.len(), 3);
        assert!(!h.can_redo());
        assert_eq!(h.current(), &3);
    }
}
