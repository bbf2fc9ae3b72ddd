//! Board geometry, entity identities and the initial layout

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::action::Action;
use crate::{Error, Result};

/// A cell coordinate, `row` first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Coordinate one step away in the direction of `action`.
    ///
    /// Returns `None` when the step would go below row or column zero. The
    /// upper edge is checked by [`Board::neighbor`].
    pub fn offset(self, action: Action) -> Option<Coord> {
        let (dr, dc) = action.delta();
        Some(Coord {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }

    /// Displacement from `origin` to `self` as (row delta, column delta)
    pub fn displacement_from(self, origin: Coord) -> (isize, isize) {
        (
            self.row as isize - origin.row as isize,
            self.col as isize - origin.col as isize,
        )
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cells that still hold a collectible
pub type ItemSet = BTreeSet<Coord>;

/// The four adversary identities, ordered from least to most lethal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Adversary {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Adversary {
    pub const ALL: [Adversary; 4] = [
        Adversary::Red,
        Adversary::Blue,
        Adversary::Yellow,
        Adversary::Green,
    ];

    /// Identity index, 1 through 4
    pub fn index(self) -> usize {
        self.slot() + 1
    }

    /// Zero-based slot for per-adversary arrays
    pub(crate) fn slot(self) -> usize {
        match self {
            Adversary::Red => 0,
            Adversary::Blue => 1,
            Adversary::Yellow => 2,
            Adversary::Green => 3,
        }
    }

    /// Probability that an encounter with this adversary is fatal
    pub fn lethality(self) -> f64 {
        0.2 * self.index() as f64
    }

    /// Probability that the agent survives an encounter
    pub fn survival_probability(self) -> f64 {
        1.0 - self.lethality()
    }

    pub fn name(self) -> &'static str {
        match self {
            Adversary::Red => "red",
            Adversary::Blue => "blue",
            Adversary::Yellow => "yellow",
            Adversary::Green => "green",
        }
    }
}

impl fmt::Display for Adversary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can occupy a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    Agent,
    Adversary(Adversary),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Agent => f.write_str("agent"),
            Entity::Adversary(adversary) => write!(f, "{adversary} adversary"),
        }
    }
}

/// Initial contents of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub occupant: Option<Entity>,
    pub has_item: bool,
}

impl Cell {
    /// Decode a two-digit category code.
    ///
    /// Tens digit: `1` nothing, `2`-`5` adversaries red to green, `7` agent.
    /// Units digit: `0` no item, `1` item.
    pub fn from_code(code: u8) -> Option<Cell> {
        let occupant = match code / 10 {
            1 => None,
            2 => Some(Entity::Adversary(Adversary::Red)),
            3 => Some(Entity::Adversary(Adversary::Blue)),
            4 => Some(Entity::Adversary(Adversary::Yellow)),
            5 => Some(Entity::Adversary(Adversary::Green)),
            7 => Some(Entity::Agent),
            _ => return None,
        };
        let has_item = match code % 10 {
            0 => false,
            1 => true,
            _ => return None,
        };
        Some(Cell { occupant, has_item })
    }

    /// Encode back to a category code
    pub fn code(self) -> u8 {
        let tens = match self.occupant {
            None => 1,
            Some(Entity::Adversary(adversary)) => 1 + adversary.index() as u8,
            Some(Entity::Agent) => 7,
        };
        tens * 10 + u8::from(self.has_item)
    }
}

/// Where every entity currently is
///
/// The agent is always somewhere; an adversary is `None` once eliminated or
/// when it was never placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locations {
    pub agent: Coord,
    adversaries: [Option<Coord>; 4],
}

impl Locations {
    /// Agent at `agent`, no adversaries
    pub fn new(agent: Coord) -> Self {
        Self {
            agent,
            adversaries: [None; 4],
        }
    }

    /// Builder-style placement of one adversary
    pub fn with_adversary(mut self, adversary: Adversary, at: Coord) -> Self {
        self.adversaries[adversary.slot()] = Some(at);
        self
    }

    pub fn adversary(&self, adversary: Adversary) -> Option<Coord> {
        self.adversaries[adversary.slot()]
    }

    pub(crate) fn remove_adversary(&mut self, adversary: Adversary) {
        self.adversaries[adversary.slot()] = None;
    }

    /// Adversaries still on the board, in identity order
    pub fn present_adversaries(&self) -> impl Iterator<Item = (Adversary, Coord)> + '_ {
        Adversary::ALL
            .into_iter()
            .filter_map(|adversary| self.adversary(adversary).map(|at| (adversary, at)))
    }

    /// Adversaries standing on `cell`
    pub fn adversaries_at(&self, cell: Coord) -> impl Iterator<Item = Adversary> + '_ {
        self.present_adversaries()
            .filter(move |&(_, at)| at == cell)
            .map(|(adversary, _)| adversary)
    }

    /// First adversary standing on `cell`, if any
    pub fn adversary_at(&self, cell: Coord) -> Option<Adversary> {
        self.adversaries_at(cell).next()
    }
}

/// Immutable board captured at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    initial_locations: Locations,
    initial_items: ItemSet,
}

impl Board {
    /// Build a board from a grid of category codes (see [`Cell::from_code`]).
    pub fn from_codes<R: AsRef<[u8]>>(grid: &[R]) -> Result<Board> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, |row| row.as_ref().len());
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyBoard);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (r, row) in grid.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::RaggedRow {
                    row: r,
                    expected: cols,
                    got: row.len(),
                });
            }
            for (c, &code) in row.iter().enumerate() {
                let cell = Cell::from_code(code).ok_or(Error::InvalidCellCode {
                    code,
                    row: r,
                    col: c,
                })?;
                cells.push(cell);
            }
        }

        Self::from_cells(rows, cols, cells)
    }

    /// Build a board from entity locations and item cells.
    pub fn from_placement(
        rows: usize,
        cols: usize,
        locations: &Locations,
        items: &ItemSet,
    ) -> Result<Board> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyBoard);
        }

        let mut cells = vec![Cell::default(); rows * cols];
        let entities = std::iter::once((Entity::Agent, locations.agent)).chain(
            locations
                .present_adversaries()
                .map(|(adversary, at)| (Entity::Adversary(adversary), at)),
        );
        for (entity, at) in entities {
            let index = checked_index(rows, cols, at)?;
            if let Some(existing) = cells[index].occupant {
                return Err(Error::OverlappingEntities {
                    first: existing.to_string(),
                    second: entity.to_string(),
                    row: at.row,
                    col: at.col,
                });
            }
            cells[index].occupant = Some(entity);
        }
        for &item in items {
            let index = checked_index(rows, cols, item)?;
            cells[index].has_item = true;
        }

        Self::from_cells(rows, cols, cells)
    }

    /// Parse the inline layout format: rows separated by `/`, codes by `,`.
    ///
    /// ```
    /// use ghostgrid::grid::Board;
    ///
    /// let board: Board = "20,11/10,70".parse().unwrap();
    /// assert_eq!(board.rows(), 2);
    /// assert_eq!(board.initial_items().len(), 1);
    /// ```
    pub fn parse_layout(layout: &str) -> Result<Board> {
        let mut grid = Vec::new();
        for (r, line) in layout.trim().split('/').enumerate() {
            let row = line
                .split(',')
                .enumerate()
                .map(|(c, token)| {
                    token
                        .trim()
                        .parse::<u8>()
                        .map_err(|_| Error::InvalidLayoutToken {
                            token: token.trim().to_string(),
                            row: r,
                            col: c,
                        })
                })
                .collect::<Result<Vec<u8>>>()?;
            grid.push(row);
        }
        Self::from_codes(&grid)
    }

    fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Board> {
        let mut agent = None;
        let mut adversaries: [Option<Coord>; 4] = [None; 4];
        let mut items = ItemSet::new();

        for (index, cell) in cells.iter().enumerate() {
            let at = Coord::new(index / cols, index % cols);
            match cell.occupant {
                Some(Entity::Agent) => {
                    if agent.replace(at).is_some() {
                        return Err(Error::DuplicateEntity {
                            entity: Entity::Agent.to_string(),
                        });
                    }
                }
                Some(Entity::Adversary(adversary)) => {
                    if adversaries[adversary.slot()].replace(at).is_some() {
                        return Err(Error::DuplicateEntity {
                            entity: Entity::Adversary(adversary).to_string(),
                        });
                    }
                }
                None => {}
            }
            if cell.has_item {
                items.insert(at);
            }
        }

        let agent = agent.ok_or(Error::MissingAgent)?;
        let initial_locations = Locations { agent, adversaries };

        Ok(Board {
            rows,
            cols,
            cells,
            initial_locations,
            initial_items: items,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Neighbouring cell in the direction of `action`, `None` if off-board
    pub fn neighbor(&self, at: Coord, action: Action) -> Option<Coord> {
        at.offset(action).filter(|&next| self.contains(next))
    }

    /// Initial contents of a cell
    pub fn cell(&self, at: Coord) -> Option<Cell> {
        self.contains(at).then(|| self.cells[at.row * self.cols + at.col])
    }

    pub fn initial_locations(&self) -> &Locations {
        &self.initial_locations
    }

    pub fn initial_items(&self) -> &ItemSet {
        &self.initial_items
    }

    /// Render the initial layout in the inline format
    pub fn to_layout_string(&self) -> String {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .filter_map(|col| self.cell(Coord::new(row, col)))
                    .map(|cell| cell.code().to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    pub(crate) fn check_bounds(&self, at: Coord) -> Result<()> {
        checked_index(self.rows, self.cols, at).map(|_| ())
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_layout(s)
    }
}

fn checked_index(rows: usize, cols: usize, at: Coord) -> Result<usize> {
    if at.row < rows && at.col < cols {
        Ok(at.row * cols + at.col)
    } else {
        Err(Error::OutOfBounds {
            row: at.row,
            col: at.col,
            rows,
            cols,
        })
    }
}
