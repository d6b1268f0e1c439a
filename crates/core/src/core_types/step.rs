//! Per-tick domain snapshots

use serde::Serialize;

use crate::core_types::cell::Cell;
use crate::core_types::geo::Coordinates;

/// One tick's cell graph: an append-only arena of cells plus a finality
/// flag. Cells reference each other by index into `cells`; the arena never
/// reorders or removes entries, so indices stay valid for the lifetime of
/// the step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Step {
    cells: Vec<Cell>,
    #[serde(rename = "isFinal")]
    is_final: bool,
}

impl Step {
    pub fn new() -> Self {
        Step::default()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Appends a cell and returns its arena index.
    pub(crate) fn push_cell(&mut self, cell: Cell) -> u32 {
        let index = self.cells.len() as u32;
        self.cells.push(cell);
        index
    }

    pub fn cell(&self, index: u32) -> &Cell {
        &self.cells[index as usize]
    }

    pub fn find_cell(&self, coordinates: Coordinates) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|cell| cell.coordinates() == coordinates)
    }

    pub fn has_burning_cells(&self) -> bool {
        self.cells.iter().any(Cell::is_burning)
    }

    pub fn count_damaged_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.state().is_damaged())
            .count()
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub(crate) fn mark_final(&mut self) {
        self.is_final = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::cell::CellState;
    use crate::core_types::weather::{Factors, ForestType, Weather};

    fn cell(x: i32, heat: f64, fuel: f64) -> Cell {
        Cell::new(
            Coordinates::new(x, 0),
            CellState::new(heat, fuel),
            Factors::new(0.0, ForestType::Mixed, Weather::new(25.0, 0.3, 0.0, 0.0)),
        )
    }

    #[test]
    fn test_push_cell_returns_stable_indices() {
        let mut step = Step::new();
        assert_eq!(step.push_cell(cell(0, 0.0, 0.5)), 0);
        assert_eq!(step.push_cell(cell(1, 0.0, 0.5)), 1);
        assert_eq!(step.cell(1).coordinates(), Coordinates::new(1, 0));
    }

    #[test]
    fn test_burning_detection() {
        let mut step = Step::new();
        step.push_cell(cell(0, 20.0, 0.5));
        assert!(!step.has_burning_cells());
        step.push_cell(cell(1, 900.0, 0.5));
        assert!(step.has_burning_cells());
    }
}
