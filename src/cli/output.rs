//! Output formatting for CLI

use crate::{
    grid::{Action, Board, Coord},
    q_learning::QTable,
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Highest-valued action of a cell, first in canonical order on ties.
/// `None` for cells the table has never updated.
pub fn greedy_action(values: [f64; Action::COUNT]) -> Option<Action> {
    if values.iter().all(|value| *value == 0.0) {
        return None;
    }
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    Action::from_index(best)
}

/// Render the greedy action of every cell, one board row per line.
/// Unvisited cells are shown as `.`.
pub fn render_greedy_policy(board: &Board, q_table: &QTable) -> Vec<String> {
    (0..board.rows())
        .map(|row| {
            (0..board.cols())
                .map(|col| {
                    greedy_action(q_table.values(Coord::new(row, col)))
                        .map_or('.', Action::symbol)
                        .to_string()
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_greedy_action() {
        assert_eq!(greedy_action([0.0; 4]), None);
        assert_eq!(greedy_action([0.0, 0.0, 0.0, 1.0]), Some(Action::Right));
        assert_eq!(greedy_action([0.5, 0.5, -1.0, 0.0]), Some(Action::Up));
        assert_eq!(greedy_action([-1.0, -0.5, -2.0, -3.0]), Some(Action::Down));
    }

    #[test]
    fn test_render_greedy_policy() {
        let board: Board = "70,11".parse().unwrap();
        let mut q_table = QTable::new(1, 2, 0.5, 0.9);
        q_table.update(Coord::new(0, 0), Action::Right, Coord::new(0, 1), 11.0);

        assert_eq!(render_greedy_policy(&board, &q_table), vec!["R ."]);
    }
}
