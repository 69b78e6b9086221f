//! Dense cell grid and the propagation rule.

use fire_propagation_core::{CellCoord, CellState, GridError, GridSize, WallDensity};
use rand::Rng;

/// Square grid of cell states stored in a single row-major buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Creates a grid of the provided size with every cell safe.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![CellState::Safe; size.cell_count()],
        }
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the state of the provided cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the cell lies outside the grid.
    pub fn cell(&self, cell: CellCoord) -> Result<CellState, GridError> {
        let index = self.index(cell)?;
        Ok(self.cells[index])
    }

    /// Flips a cell between safe and wall.
    ///
    /// Burning cells are left untouched and yield `Ok(None)`. On success the
    /// new state of the cell is returned.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the cell lies outside the grid.
    pub fn toggle_wall(&mut self, cell: CellCoord) -> Result<Option<CellState>, GridError> {
        let index = self.index(cell)?;
        let next = match self.cells[index] {
            CellState::Safe => CellState::Wall,
            CellState::Wall => CellState::Safe,
            CellState::OnFire => return Ok(None),
        };
        self.cells[index] = next;
        Ok(Some(next))
    }

    /// Forces a cell into the burning state, overriding walls.
    ///
    /// Returns `true` when the cell was not burning before.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the cell lies outside the grid.
    pub fn ignite(&mut self, cell: CellCoord) -> Result<bool, GridError> {
        let index = self.index(cell)?;
        let previous = std::mem::replace(&mut self.cells[index], CellState::OnFire);
        Ok(!previous.is_burning())
    }

    /// Sets a uniformly chosen cell on fire and returns its coordinate.
    pub fn ignite_random<R: Rng>(&mut self, rng: &mut R) -> CellCoord {
        let side = self.size.get();
        let cell = CellCoord::new(rng.gen_range(0..side), rng.gen_range(0..side));
        let index = self.offset(cell);
        self.cells[index] = CellState::OnFire;
        cell
    }

    /// Computes the next generation without mutating the current one.
    ///
    /// Every spread decision reads the current grid only, so fire advances by
    /// exactly one cell per generation regardless of scan order.
    #[must_use]
    pub fn step(&self) -> Generation {
        let mut next = self.clone();
        let mut ignited = Vec::new();

        for (index, state) in self.cells.iter().enumerate() {
            if !state.is_burning() {
                continue;
            }

            for neighbor in orthogonal_neighbors(self.coord(index), self.size) {
                let target = self.offset(neighbor);
                if self.cells[target].is_wall() || next.cells[target].is_burning() {
                    continue;
                }
                next.cells[target] = CellState::OnFire;
                ignited.push(neighbor);
            }
        }

        ignited.sort_unstable();
        Generation {
            grid: next,
            ignited,
        }
    }

    /// Reverts every burning cell to safe ground, returning how many changed.
    pub fn clear_fire(&mut self) -> usize {
        self.replace_all(CellState::OnFire, CellState::Safe)
    }

    /// Reverts every wall to safe ground, returning how many changed.
    pub fn clear_walls(&mut self) -> usize {
        self.replace_all(CellState::Wall, CellState::Safe)
    }

    /// Replaces all walls with a fresh random layout.
    ///
    /// Each cell independently becomes a wall with probability `density`.
    /// Burning cells keep burning. Returns the number of walls placed.
    pub fn randomize_walls<R: Rng>(&mut self, density: WallDensity, rng: &mut R) -> usize {
        let _ = self.clear_walls();

        let mut placed = 0;
        for cell in &mut self.cells {
            let roll = rng.gen_bool(density.get());
            if roll && !cell.is_burning() {
                *cell = CellState::Wall;
                placed += 1;
            }
        }
        placed
    }

    /// Reports whether any cell is burning.
    #[must_use]
    pub fn has_fire(&self) -> bool {
        self.cells.iter().any(|state| state.is_burning())
    }

    /// Counts cells per state.
    #[must_use]
    pub fn census(&self) -> CellCensus {
        self.cells
            .iter()
            .fold(CellCensus::default(), |mut census, state| {
                match state {
                    CellState::Safe => census.safe += 1,
                    CellState::Wall => census.walls += 1,
                    CellState::OnFire => census.burning += 1,
                }
                census
            })
    }

    /// Iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks_exact(self.size.get() as usize)
    }

    /// Iterator over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, state)| (self.coord(index), *state))
    }

    fn replace_all(&mut self, from: CellState, to: CellState) -> usize {
        let mut replaced = 0;
        for cell in self.cells.iter_mut().filter(|cell| **cell == from) {
            *cell = to;
            replaced += 1;
        }
        replaced
    }

    fn index(&self, cell: CellCoord) -> Result<usize, GridError> {
        if self.size.contains(cell) {
            Ok(self.offset(cell))
        } else {
            Err(GridError::OutOfBounds {
                cell,
                size: self.size,
            })
        }
    }

    fn offset(&self, cell: CellCoord) -> usize {
        let side = self.size.get() as usize;
        cell.row() as usize * side + cell.column() as usize
    }

    fn coord(&self, index: usize) -> CellCoord {
        let side = self.size.get() as usize;
        CellCoord::new((index / side) as u32, (index % side) as u32)
    }
}

/// Outcome of a single propagation step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    grid: Grid,
    ignited: Vec<CellCoord>,
}

impl Generation {
    /// Reports whether any cell changed state. `false` signals saturation.
    #[must_use]
    pub fn any_changed(&self) -> bool {
        !self.ignited.is_empty()
    }

    /// Cells that caught fire in this generation, in row-major order.
    #[must_use]
    pub fn ignited(&self) -> &[CellCoord] {
        &self.ignited
    }

    /// Grid holding the new generation.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Consumes the generation, yielding the new grid and the ignited cells.
    #[must_use]
    pub fn into_parts(self) -> (Grid, Vec<CellCoord>) {
        (self.grid, self.ignited)
    }
}

/// Number of cells in each state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellCensus {
    /// Cells that are neither walls nor burning.
    pub safe: usize,
    /// Wall cells.
    pub walls: usize,
    /// Burning cells.
    pub burning: usize,
}

fn orthogonal_neighbors(cell: CellCoord, size: GridSize) -> impl Iterator<Item = CellCoord> {
    let (row, column) = (cell.row(), cell.column());
    [
        row.checked_sub(1).map(|up| CellCoord::new(up, column)),
        row.checked_add(1).map(|down| CellCoord::new(down, column)),
        column.checked_sub(1).map(|left| CellCoord::new(row, left)),
        column.checked_add(1).map(|right| CellCoord::new(row, right)),
    ]
    .into_iter()
    .flatten()
    .filter(move |neighbor| size.contains(*neighbor))
}
