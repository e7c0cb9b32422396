//! Instruction cursor over the program text.
//!
//! The scanner hands out one character at a time and can reposition itself
//! onto a bracket. The plain `seek_*` methods search for the textually nearest
//! occurrence of a character and know nothing about nesting; the
//! `seek_matching_*` methods count depth and land on the balanced partner.

/// Read position over a program's characters.
#[derive(Debug, Clone)]
pub struct Scanner {
    source: Vec<char>,
    // None until the first `advance`.
    position: Option<usize>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            position: None,
        }
    }

    /// Index of the last consumed character, or `None` before the first `advance`.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn next_index(&self) -> usize {
        self.position.map_or(0, |p| p + 1)
    }

    pub fn has_next(&self) -> bool {
        self.next_index() < self.source.len()
    }

    /// Step to the next character and return it, or `None` once exhausted.
    pub fn advance(&mut self) -> Option<char> {
        let next = self.next_index();
        let ch = *self.source.get(next)?;
        self.position = Some(next);
        Some(ch)
    }

    /// Move onto the first `target` at or after the current position.
    ///
    /// Returns `false` and leaves the position alone when there is none.
    pub fn seek_forward(&mut self, target: char) -> bool {
        let start = self.position.unwrap_or(0);
        let found = self.source[start.min(self.source.len())..]
            .iter()
            .position(|&c| c == target)
            .map(|offset| start + offset);
        self.land(found)
    }

    /// Move onto the first `target` at or before the current position.
    ///
    /// Returns `false` and leaves the position alone when there is none.
    pub fn seek_back(&mut self, target: char) -> bool {
        let Some(start) = self.position else {
            return false;
        };
        let found = self.source[..=start].iter().rposition(|&c| c == target);
        self.land(found)
    }

    /// Move from the `[` under the position onto its depth-balanced `]`.
    pub fn seek_matching_forward(&mut self) -> bool {
        let Some(start) = self.position else {
            return false;
        };
        let mut depth = 0usize;
        let mut found = None;
        for (i, &c) in self.source.iter().enumerate().skip(start) {
            match c {
                '[' => depth += 1,
                ']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        found = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        self.land(found)
    }

    /// Move from the `]` under the position back onto its depth-balanced `[`.
    pub fn seek_matching_back(&mut self) -> bool {
        let Some(start) = self.position else {
            return false;
        };
        let mut depth = 0usize;
        let mut found = None;
        for i in (0..=start).rev() {
            match self.source[i] {
                ']' => depth += 1,
                '[' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        found = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        self.land(found)
    }

    fn land(&mut self, found: Option<usize>) -> bool {
        match found {
            Some(i) => {
                self.position = Some(i);
                true
            }
            None => false,
        }
    }
}
