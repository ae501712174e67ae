#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Highlighted position over a result list of known length. Wraps at both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    position: Option<usize>,
    len: usize,
}

impl SelectionCursor {
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.position = if len > 0 { Some(0) } else { None };
    }

    pub fn next(&mut self) {
        if let Some(position) = self.position {
            self.position = Some((position + 1) % self.len);
        }
    }

    pub fn prev(&mut self) {
        if let Some(position) = self.position {
            self.position = Some((position + self.len - 1) % self.len);
        }
    }

    pub fn step(&mut self, direction: Direction) {
        match direction {
            Direction::Next => self.next(),
            Direction::Prev => self.prev(),
        }
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.position = Some(index);
        true
    }

    pub fn current(&self) -> Option<usize> {
        self.position
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
