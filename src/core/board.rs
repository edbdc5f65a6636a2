use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::GameError;

/// Direction of an edge between two grid points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of an edge on the board.
///
/// A horizontal edge `(r, c)` is the top side of box `(r, c)`; a vertical
/// edge `(r, c)` is its left side. The bottom row of horizontals and the
/// right column of verticals close off the last boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgePosition {
    pub row: usize,
    pub col: usize,
    pub orientation: Orientation,
}

impl EdgePosition {
    pub fn horizontal(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn vertical(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            orientation: Orientation::Vertical,
        }
    }

    /// Whether the edge lies on a board of `grid_size` x `grid_size` boxes
    pub fn is_within(&self, grid_size: usize) -> bool {
        match self.orientation {
            Orientation::Horizontal => self.row <= grid_size && self.col < grid_size,
            Orientation::Vertical => self.row < grid_size && self.col <= grid_size,
        }
    }

    /// Boxes bordered by this edge, in row-major order
    pub fn adjacent_boxes(&self, grid_size: usize) -> Vec<(usize, usize)> {
        let mut boxes = Vec::with_capacity(2);
        match self.orientation {
            Orientation::Horizontal => {
                if self.row > 0 {
                    boxes.push((self.row - 1, self.col));
                }
                if self.row < grid_size {
                    boxes.push((self.row, self.col));
                }
            }
            Orientation::Vertical => {
                if self.col > 0 {
                    boxes.push((self.row, self.col - 1));
                }
                if self.col < grid_size {
                    boxes.push((self.row, self.col));
                }
            }
        }
        boxes
    }
}

/// A placed edge. Never modified after placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub position: EdgePosition,
    pub owner_id: String,
}

/// One box of the board and the money it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denomination: u64,
    pub owner_id: Option<String>,
}

/// A box captured by a single placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedBox {
    pub row: usize,
    pub col: usize,
    pub value: u64,
}

/// Edges placed so far and the coin grid they enclose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid_size: usize,
    edges: Vec<Edge>,
    occupied: HashSet<EdgePosition>,
    coins: Vec<Vec<Coin>>,
}

impl Board {
    /// Build an empty board over a row-major grid of denominations
    pub fn new(denominations: Vec<Vec<u64>>) -> Self {
        let grid_size = denominations.len();
        let coins = denominations
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|denomination| Coin {
                        denomination,
                        owner_id: None,
                    })
                    .collect()
            })
            .collect();

        Self {
            grid_size,
            edges: Vec::new(),
            occupied: HashSet::new(),
            coins,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn coins(&self) -> &[Vec<Coin>] {
        &self.coins
    }

    pub fn coin(&self, row: usize, col: usize) -> Option<&Coin> {
        self.coins.get(row).and_then(|r| r.get(col))
    }

    pub fn has_edge(&self, position: &EdgePosition) -> bool {
        self.occupied.contains(position)
    }

    /// Check that an edge could be placed, without placing it
    pub fn check_placeable(&self, position: &EdgePosition) -> Result<(), GameError> {
        if !position.is_within(self.grid_size) {
            return Err(GameError::EdgeOutOfBounds {
                row: position.row,
                col: position.col,
                orientation: position.orientation,
            });
        }
        if self.has_edge(position) {
            return Err(GameError::EdgeOccupied);
        }
        Ok(())
    }

    /// Whether all four sides of box `(row, col)` are placed
    pub fn is_enclosed(&self, row: usize, col: usize) -> bool {
        self.has_edge(&EdgePosition::horizontal(row, col))
            && self.has_edge(&EdgePosition::horizontal(row + 1, col))
            && self.has_edge(&EdgePosition::vertical(row, col))
            && self.has_edge(&EdgePosition::vertical(row, col + 1))
    }

    /// Place an edge and claim every box it closes for `owner_id`.
    ///
    /// Only the boxes on either side of the new edge can change, so only
    /// those are inspected. Captures are returned in row-major order.
    pub fn place(
        &mut self,
        position: EdgePosition,
        owner_id: &str,
    ) -> Result<Vec<CapturedBox>, GameError> {
        self.check_placeable(&position)?;

        self.occupied.insert(position);
        self.edges.push(Edge {
            position,
            owner_id: owner_id.to_string(),
        });

        let mut captured = Vec::new();
        for (row, col) in position.adjacent_boxes(self.grid_size) {
            if self.coins[row][col].owner_id.is_some() || !self.is_enclosed(row, col) {
                continue;
            }
            let coin = &mut self.coins[row][col];
            coin.owner_id = Some(owner_id.to_string());
            captured.push(CapturedBox {
                row,
                col,
                value: coin.denomination,
            });
        }

        Ok(captured)
    }

    /// Whether every box has been captured
    pub fn is_complete(&self) -> bool {
        self.coins
            .iter()
            .all(|row| row.iter().all(|coin| coin.owner_id.is_some()))
    }

    /// Every edge position not yet placed
    pub fn free_edges(&self) -> Vec<EdgePosition> {
        let n = self.grid_size;
        let horizontals = (0..=n)
            .flat_map(|row| (0..n).map(move |col| EdgePosition::horizontal(row, col)));
        let verticals = (0..n)
            .flat_map(|row| (0..=n).map(move |col| EdgePosition::vertical(row, col)));

        horizontals
            .chain(verticals)
            .filter(|position| !self.has_edge(position))
            .collect()
    }

    /// Sum of all denominations on the board
    pub fn total_value(&self) -> u64 {
        self.coins
            .iter()
            .flat_map(|row| row.iter().map(|coin| coin.denomination))
            .sum()
    }
}
