use std::io::{self, Write};

use fire_propagation_core::{CellState, SimulationState};
use fire_propagation_world::Grid;

const SAFE_GLYPH: char = '.';
const WALL_GLYPH: char = '#';
const FIRE_GLYPH: char = '*';

/// Writes one generation as ASCII rows followed by a status line.
pub(crate) fn write_frame(
    out: &mut impl Write,
    grid: &Grid,
    generation: u64,
    state: SimulationState,
) -> io::Result<()> {
    for row in grid.rows() {
        let line: String = row.iter().copied().map(glyph).collect();
        writeln!(out, "{line}")?;
    }

    let census = grid.census();
    writeln!(
        out,
        "generation {generation} [{state}] burning {} / walls {} / safe {}",
        census.burning, census.walls, census.safe
    )?;
    writeln!(out)
}

fn glyph(state: CellState) -> char {
    match state {
        CellState::Safe => SAFE_GLYPH,
        CellState::Wall => WALL_GLYPH,
        CellState::OnFire => FIRE_GLYPH,
    }
}

#[cfg(test)]
mod tests {
    use fire_propagation_core::{CellCoord, GridSize};

    use super::*;

    #[test]
    fn frame_marks_every_cell_state() {
        let mut grid = Grid::new(GridSize::new(3).expect("size"));
        let _ = grid.toggle_wall(CellCoord::new(0, 2)).expect("toggle");
        let _ = grid.ignite(CellCoord::new(1, 1)).expect("ignite");
        let mut out = Vec::new();

        write_frame(&mut out, &grid, 4, SimulationState::Running).expect("write");

        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "..#\n.*.\n...\ngeneration 4 [running] burning 1 / walls 1 / safe 7\n\n"
        );
    }
}
