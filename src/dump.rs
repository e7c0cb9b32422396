//! Post-run tape dump.
//!
//! Renders the cells `0..=high_water` of a halted machine as three aligned
//! lines: an index ruler, the cell values, and a caret under the cursor.
//!
//! ```text
//! index    = |  0|  1|
//! data     = |  0|  5|
//! pointer  =    ^
//! ```

use std::fmt::Write;

use crate::machine::Machine;

const CELL_WIDTH: usize = 4;

/// Render the visited part of the tape.
pub fn render(machine: &Machine) -> String {
    let visible = &machine.tape()[..=machine.high_water()];
    let mut out = String::new();

    out.push_str("index    = ");
    for i in 0..visible.len() {
        let _ = write!(out, "|{i:>3}");
    }
    out.push_str("|\n");

    out.push_str("data     = ");
    for cell in visible {
        let _ = write!(out, "|{cell:>3}");
    }
    out.push_str("|\n");

    // Caret sits under the last digit column of the cursor's cell.
    out.push_str("pointer  = ");
    out.push_str(&" ".repeat(machine.cursor() * CELL_WIDTH + CELL_WIDTH - 1));
    out.push_str("^\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_machine_shows_one_cell() {
        let m = Machine::new(4);
        assert_eq!(
            render(&m),
            "index    = |  0|\ndata     = |  0|\npointer  =    ^\n"
        );
    }

    #[test]
    fn caret_follows_cursor_within_high_water() {
        let mut m = Machine::new(4);
        m.move_right().unwrap();
        m.move_right().unwrap();
        m.increment();
        m.move_left().unwrap();
        let lines: Vec<String> = render(&m).lines().map(str::to_string).collect();
        assert_eq!(lines[0], "index    = |  0|  1|  2|");
        assert_eq!(lines[1], "data     = |  0|  0|  1|");
        let caret = lines[2].find('^').unwrap();
        assert_eq!(&lines[0][caret..=caret], "1");
    }

    #[test]
    fn wide_values_stay_aligned() {
        let mut m = Machine::new(2);
        m.decrement();
        let dump = render(&m);
        assert!(dump.contains("data     = |255|"));
    }
}
