//! Chunk activity tracking
//!
//! The grid is tiled into square chunks. Rules flag the chunk of every cell they
//! activate; full-grid maintenance scans then only visit flagged chunks.

use glam::IVec2;

/// Rectangular tile of the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub active: bool,
}

impl Chunk {
    /// Iterate the flat indices covered by this chunk
    pub fn indices(&self, grid_width: usize) -> impl Iterator<Item = usize> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| y * grid_width + x))
    }
}

/// All chunks of a grid plus the list of chunks touched this tick
#[derive(Clone, Debug)]
pub struct ChunkIndex {
    chunk_size: usize,
    grid_width: usize,
    cols: usize,
    rows: usize,
    chunks: Vec<Chunk>,
    active_list: Vec<usize>,
}

impl ChunkIndex {
    pub fn new(grid_width: usize, grid_height: usize, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let cols = grid_width.div_ceil(chunk_size);
        let rows = grid_height.div_ceil(chunk_size);

        let mut chunks = Vec::with_capacity(cols * rows);
        for cy in 0..rows {
            for cx in 0..cols {
                let x = cx * chunk_size;
                let y = cy * chunk_size;
                chunks.push(Chunk {
                    x,
                    y,
                    width: chunk_size.min(grid_width - x),
                    height: chunk_size.min(grid_height - y),
                    active: false,
                });
            }
        }

        Self {
            chunk_size,
            grid_width,
            cols,
            rows,
            chunks,
            active_list: Vec::new(),
        }
    }

    /// Chunk grid dimensions (columns, rows)
    pub fn dimensions(&self) -> IVec2 {
        IVec2::new(self.cols as i32, self.rows as i32)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Position of the chunk containing a cell
    pub fn chunk_pos(&self, index: usize) -> IVec2 {
        let x = index % self.grid_width.max(1);
        let y = index / self.grid_width.max(1);
        IVec2::new((x / self.chunk_size) as i32, (y / self.chunk_size) as i32)
    }

    fn chunk_slot(&self, index: usize) -> Option<usize> {
        let pos = self.chunk_pos(index);
        let slot = pos.y as usize * self.cols + pos.x as usize;
        (slot < self.chunks.len()).then_some(slot)
    }

    /// Flag the chunk containing a cell
    pub fn activate_cell(&mut self, index: usize) {
        if let Some(slot) = self.chunk_slot(index)
            && !self.chunks[slot].active
        {
            self.chunks[slot].active = true;
            self.active_list.push(slot);
        }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.chunk_slot(index)
            .is_some_and(|slot| self.chunks[slot].active)
    }

    /// Chunks flagged since the last [`clear`](Self::clear)
    pub fn active_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.active_list.iter().map(|slot| &self.chunks[*slot])
    }

    pub fn active_count(&self) -> usize {
        self.active_list.len()
    }

    pub fn clear(&mut self) {
        for slot in self.active_list.drain(..) {
            self.chunks[slot].active = false;
        }
    }
}
