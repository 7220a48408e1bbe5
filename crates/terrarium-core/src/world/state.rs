//! Shared mutable world state passed to every rule engine

use terrarium_simulation::CellType;

use super::active::{ActivePixels, PixelSet};
use super::chunk::ChunkIndex;
use super::forcing::Forcing;
use super::grid::Grid;
use super::rng_trait::WorldRng;
use super::stats::Census;
use crate::config::{SimConfig, ground_level_row};
use crate::error::SimError;

/// Grid, active sets, per-tick flags and forcing for one world
#[derive(Clone, Debug)]
pub struct WorldState {
    pub grid: Grid,
    pub chunks: ChunkIndex,
    pub forcing: Forcing,
    active: ActivePixels,
    processed: Vec<bool>,
    bio_processed: Vec<bool>,
    ground_level: usize,
    ticking: bool,
}

impl WorldState {
    /// Empty (all AIR) world shaped by `config`
    pub fn new(config: &SimConfig) -> Self {
        let grid = Grid::new(config.grid.width, config.grid.height);
        Self::with_grid(grid, config)
    }

    /// Wrap an existing grid
    pub fn with_grid(grid: Grid, config: &SimConfig) -> Self {
        let size = grid.size();
        let (width, height) = (grid.width(), grid.height());
        let env = &config.environment;
        Self {
            chunks: ChunkIndex::new(width, height, config.grid.chunk_size),
            forcing: Forcing::new(
                width,
                height,
                env.start_phase,
                env.base_temperature + env.temperature_offset,
            ),
            active: ActivePixels::new(size),
            processed: vec![false; size],
            bio_processed: vec![false; size],
            ground_level: ground_level_row(height, config.grid.ground_level_ratio),
            ticking: false,
            grid,
        }
    }

    pub fn ground_level(&self) -> usize {
        self.ground_level
    }

    /// Ticks completed so far
    pub fn tick(&self) -> u64 {
        self.forcing.tick
    }

    /// Cells that will be evaluated on the next tick
    pub fn active(&self) -> &PixelSet {
        &self.active.current
    }

    /// Cells queued so far during the running tick
    pub fn pending(&self) -> &PixelSet {
        &self.active.next
    }

    /// Mark a cell for evaluation
    ///
    /// During a tick the cell joins the set built for the following tick; between
    /// ticks (tools, world generation) it joins the set the next tick iterates.
    pub fn activate(&mut self, index: usize) {
        if index >= self.grid.size() {
            return;
        }
        if self.ticking {
            self.active.next.insert(index);
        } else {
            self.active.current.insert(index);
        }
        self.chunks.activate_cell(index);
    }

    pub fn activate_neighbors(&mut self, index: usize) {
        for neighbor in self.grid.neighbors_of(index) {
            self.activate(neighbor.index);
        }
    }

    /// Activate a cell and its whole neighborhood
    pub fn activate_area(&mut self, index: usize) {
        self.activate(index);
        self.activate_neighbors(index);
    }

    /// Activate every non-AIR cell
    pub fn activate_all_matter(&mut self) {
        for index in 0..self.grid.size() {
            if self.grid.cell_type[index] != CellType::Air {
                self.activate(index);
            }
        }
    }

    #[inline]
    pub fn is_processed(&self, index: usize) -> bool {
        self.processed.get(index).copied().unwrap_or(true)
    }

    #[inline]
    pub fn mark_processed(&mut self, index: usize) {
        if let Some(flag) = self.processed.get_mut(index) {
            *flag = true;
        }
    }

    #[inline]
    pub fn is_bio_processed(&self, index: usize) -> bool {
        self.bio_processed.get(index).copied().unwrap_or(true)
    }

    #[inline]
    pub fn mark_bio_processed(&mut self, index: usize) {
        if let Some(flag) = self.bio_processed.get_mut(index) {
            *flag = true;
        }
    }

    /// Rows below the ground level (negative above it)
    pub fn depth(&self, index: usize) -> i32 {
        let y = index / self.grid.width().max(1);
        y as i32 - self.ground_level as i32
    }

    pub fn is_above_ground(&self, index: usize) -> bool {
        self.depth(index) < 0
    }

    /// Swap two cells and wake everything around them
    ///
    /// The cloud overlay stays where it was.
    pub fn swap_cells(&mut self, from: usize, to: usize) -> bool {
        if !self.grid.swap_pixels(from, to) {
            return false;
        }
        self.grid.cloud.swap(from, to);
        self.activate(to);
        self.activate_area(from);
        true
    }

    /// Physics move: swap, flag both ends processed
    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        if !self.swap_cells(from, to) {
            return false;
        }
        self.mark_processed(from);
        self.mark_processed(to);
        true
    }

    /// Biology move: swap, flag both ends evaluated
    pub fn relocate_bio(&mut self, from: usize, to: usize) -> bool {
        if !self.swap_cells(from, to) {
            return false;
        }
        self.mark_bio_processed(from);
        self.mark_bio_processed(to);
        true
    }

    /// Physics conversion in place
    pub fn convert(&mut self, index: usize, cell_type: CellType, state: u8) {
        self.grid.set_cell(index, cell_type, state);
        self.mark_processed(index);
        self.activate_area(index);
    }

    /// Physics conversion to empty AIR
    pub fn clear(&mut self, index: usize) {
        self.grid.clear_cell(index);
        self.mark_processed(index);
        self.activate_area(index);
    }

    pub fn census(&self) -> Census {
        Census::take(&self.grid)
    }

    /// Verify no channel buffer was resized from outside
    pub fn check_channels(&self) -> Result<(), SimError> {
        let expected = self.grid.size();
        for (channel, actual) in self.grid.channel_lengths() {
            if actual != expected {
                return Err(SimError::ChannelLength {
                    channel,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Reset per-tick flags and route activations into the next set
    pub fn begin_tick(&mut self) {
        self.processed.fill(false);
        self.bio_processed.fill(false);
        self.ticking = true;
    }

    /// Cap the incoming set; returns the number of dropped cells
    pub fn prune_current<R: WorldRng + ?Sized>(&mut self, cap: usize, rng: &mut R) -> usize {
        self.active.current.prune(cap, &self.grid.cell_type, rng)
    }

    /// Cap the outgoing set, swap buffers and advance the tick counter
    ///
    /// Returns the number of dropped cells.
    pub fn finish_tick<R: WorldRng + ?Sized>(&mut self, cap: usize, rng: &mut R) -> usize {
        let pruned = self.active.next.prune(cap, &self.grid.cell_type, rng);
        self.active.swap();
        self.chunks.clear();
        self.forcing.tick += 1;
        self.ticking = false;
        pruned
    }
}
