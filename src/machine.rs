//! The tape machine: a fixed-capacity strip of 8-bit cells and a cursor.
//!
//! Cells wrap modulo 256. The cursor is bounds-checked: any move that would
//! leave `[0, capacity)` fails with a [`TapeError`] and leaves the machine
//! untouched, so every read and write addresses a real cell.

use std::io::{self, Write};

/// Tape capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 30_000;

/// Largest tape a machine will allocate.
pub const MAX_CAPACITY: usize = 1 << 28;

/// Errors raised when the tape cannot be built or the cursor would leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TapeError {
    /// A `<` was attempted while the cursor was on cell 0.
    #[error("cursor would move left of cell 0")]
    LeftOfStart,

    /// A `>` was attempted while the cursor was on the last cell.
    #[error("cursor would move past the last cell (capacity {capacity})")]
    PastEnd { capacity: usize },

    /// The requested tape is larger than [`MAX_CAPACITY`] or could not be allocated.
    #[error("tape capacity {requested} is unusable (maximum {max})")]
    Capacity { requested: usize, max: usize },
}

/// Tape, cursor and the furthest-right cursor position ever reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    tape: Vec<u8>,
    cursor: usize,
    high_water: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Machine {
    /// Create a zeroed machine with `capacity` cells (at least one).
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is rejected by [`Machine::try_new`].
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(machine) => machine,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a zeroed machine, failing instead of allocating an unusable tape.
    pub fn try_new(capacity: usize) -> Result<Self, TapeError> {
        let len = capacity.max(1);
        let unusable = TapeError::Capacity { requested: capacity, max: MAX_CAPACITY };
        if len > MAX_CAPACITY {
            return Err(unusable);
        }
        let mut tape = Vec::new();
        tape.try_reserve_exact(len).map_err(|_| unusable)?;
        tape.resize(len, 0);
        Ok(Self {
            tape,
            cursor: 0,
            high_water: 0,
        })
    }

    pub fn move_right(&mut self) -> Result<(), TapeError> {
        if self.cursor + 1 >= self.tape.len() {
            return Err(TapeError::PastEnd { capacity: self.tape.len() });
        }
        self.cursor += 1;
        self.high_water = self.high_water.max(self.cursor);
        Ok(())
    }

    /// Move one cell left. The high-water mark is left alone.
    pub fn move_left(&mut self) -> Result<(), TapeError> {
        if self.cursor == 0 {
            return Err(TapeError::LeftOfStart);
        }
        self.cursor -= 1;
        Ok(())
    }

    pub fn increment(&mut self) {
        let cell = &mut self.tape[self.cursor];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.tape[self.cursor];
        *cell = cell.wrapping_sub(1);
    }

    /// Value of the cell under the cursor.
    pub fn peek(&self) -> u8 {
        self.tape[self.cursor]
    }

    /// Emit the current cell as a single character followed by a newline.
    ///
    /// The cell is written as `cell as char`, so values 128..=255 become the
    /// matching Latin-1 code point encoded as two UTF-8 bytes rather than one
    /// raw byte.
    pub fn output<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.peek() as char)
    }

    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn capacity(&self) -> usize {
        self.tape.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machine_is_zeroed() {
        let m = Machine::new(8);
        assert_eq!(m.capacity(), 8);
        assert!(m.tape().iter().all(|&c| c == 0));
        assert_eq!(m.cursor(), 0);
        assert_eq!(m.high_water(), 0);
    }

    #[test]
    fn zero_capacity_still_has_one_cell() {
        let mut m = Machine::new(0);
        assert_eq!(m.capacity(), 1);
        m.increment();
        assert_eq!(m.peek(), 1);
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        assert_eq!(
            Machine::try_new(usize::MAX),
            Err(TapeError::Capacity { requested: usize::MAX, max: MAX_CAPACITY })
        );
        assert!(matches!(Machine::try_new(MAX_CAPACITY + 1), Err(TapeError::Capacity { .. })));
    }

    #[test]
    fn try_new_builds_requested_tape() {
        let m = Machine::try_new(16).unwrap();
        assert_eq!(m.capacity(), 16);
        assert!(m.tape().iter().all(|&c| c == 0));
    }

    #[test]
    fn high_cells_are_written_as_utf8() {
        let mut m = Machine::new(1);
        m.decrement();
        let mut out = Vec::new();
        m.output(&mut out).unwrap();
        assert_eq!(out, "\u{ff}\n".as_bytes());
    }

    #[test]
    fn increment_wraps_at_255() {
        let mut m = Machine::new(1);
        for _ in 0..255 {
            m.increment();
        }
        assert_eq!(m.peek(), 255);
        m.increment();
        assert_eq!(m.peek(), 0);
    }

    #[test]
    fn decrement_wraps_at_zero() {
        let mut m = Machine::new(1);
        m.decrement();
        assert_eq!(m.peek(), 255);
    }

    #[test]
    fn high_water_only_grows_on_right_moves() {
        let mut m = Machine::new(10);
        m.move_right().unwrap();
        m.move_right().unwrap();
        m.move_left().unwrap();
        m.move_left().unwrap();
        m.move_right().unwrap();
        assert_eq!(m.cursor(), 1);
        assert_eq!(m.high_water(), 2);
    }

    #[test]
    fn moving_left_of_start_fails_and_keeps_state() {
        let mut m = Machine::new(4);
        assert_eq!(m.move_left(), Err(TapeError::LeftOfStart));
        assert_eq!(m.cursor(), 0);
    }

    #[test]
    fn moving_past_end_fails_and_keeps_state() {
        let mut m = Machine::new(2);
        m.move_right().unwrap();
        assert_eq!(m.move_right(), Err(TapeError::PastEnd { capacity: 2 }));
        assert_eq!(m.cursor(), 1);
        assert_eq!(m.high_water(), 1);
    }

    #[test]
    fn output_writes_char_and_newline() {
        let mut m = Machine::new(1);
        for _ in 0..65 {
            m.increment();
        }
        let mut out = Vec::new();
        m.output(&mut out).unwrap();
        assert_eq!(out, b"A\n");
    }

    #[test]
    fn writes_touch_only_the_cursor_cell() {
        let mut m = Machine::new(3);
        m.move_right().unwrap();
        m.increment();
        m.increment();
        assert_eq!(m.tape(), &[0, 2, 0]);
    }
}
