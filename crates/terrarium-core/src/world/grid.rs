//! Flat channel storage for the whole world

use smallvec::SmallVec;
use terrarium_simulation::{CellType, Metadata, PlantState, SoilState};

/// Neighbor offsets, orthogonal first
const NEIGHBOR_OFFSETS: [(i32, i32, bool); 8] = [
    (0, -1, false),
    (-1, 0, false),
    (1, 0, false),
    (0, 1, false),
    (-1, -1, true),
    (1, -1, true),
    (-1, 1, true),
    (1, 1, true),
];

/// One in-bounds neighbor of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    pub x: usize,
    pub y: usize,
    pub index: usize,
    pub diagonal: bool,
}

/// Resource channel selector for [`Grid::transfer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Water,
    Nutrient,
    Energy,
}

/// The world grid
///
/// Channels are parallel arrays indexed by `y * width + x`. Row 0 is the top of
/// the world, so "down" is `y + 1`. The buffers are public so renderers can read
/// them and tools can paint into them between ticks.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    size: usize,

    pub cell_type: Vec<CellType>,
    pub state: Vec<u8>,
    pub water: Vec<u8>,
    pub nutrient: Vec<u8>,
    pub energy: Vec<u8>,
    pub metadata: Vec<Metadata>,
    /// Atmospheric overlay; not part of a cell, never swapped
    pub cloud: Vec<u8>,
}

impl Grid {
    /// Create an all-AIR grid
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            size,
            cell_type: vec![CellType::Air; size],
            state: vec![0; size],
            water: vec![0; size],
            nutrient: vec![0; size],
            energy: vec![0; size],
            metadata: vec![Metadata::default(); size],
            cloud: vec![0; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat index of `(x, y)`, or `None` outside the grid
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Coordinates of a flat index, or `None` outside the grid
    #[inline]
    pub fn coords(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.size {
            return None;
        }
        Some((index % self.width, index / self.width))
    }

    /// Index at a relative offset from `index`
    #[inline]
    pub fn offset(&self, index: usize, dx: i32, dy: i32) -> Option<usize> {
        let (x, y) = self.coords(index)?;
        self.index(x as i32 + dx, y as i32 + dy)
    }

    /// Cell directly below, if any
    #[inline]
    pub fn below(&self, index: usize) -> Option<usize> {
        self.offset(index, 0, 1)
    }

    /// Cell directly above, if any
    #[inline]
    pub fn above(&self, index: usize) -> Option<usize> {
        self.offset(index, 0, -1)
    }

    /// In-bounds Moore neighbors of `(x, y)`
    pub fn neighbors(&self, x: usize, y: usize) -> SmallVec<[Neighbor; 8]> {
        let mut out = SmallVec::new();
        for (dx, dy, diagonal) in NEIGHBOR_OFFSETS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if let Some(index) = self.index(nx, ny) {
                out.push(Neighbor {
                    x: nx as usize,
                    y: ny as usize,
                    index,
                    diagonal,
                });
            }
        }
        out
    }

    /// In-bounds Moore neighbors of a flat index
    pub fn neighbors_of(&self, index: usize) -> SmallVec<[Neighbor; 8]> {
        match self.coords(index) {
            Some((x, y)) => self.neighbors(x, y),
            None => SmallVec::new(),
        }
    }

    /// Exchange every per-cell channel of two cells
    ///
    /// Returns false (and does nothing) if either index is out of range or both
    /// are the same cell.
    pub fn swap_pixels(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.size || b >= self.size {
            return false;
        }
        self.cell_type.swap(a, b);
        self.state.swap(a, b);
        self.water.swap(a, b);
        self.nutrient.swap(a, b);
        self.energy.swap(a, b);
        self.metadata.swap(a, b);
        self.cloud.swap(a, b);
        true
    }

    /// Change a cell's type, writing a fresh state and metadata
    ///
    /// Resources are left as they are; callers adjust them as the transition needs.
    pub fn set_cell(&mut self, index: usize, cell_type: CellType, state: u8) {
        self.cell_type[index] = cell_type;
        self.state[index] = state;
        self.metadata[index] = Metadata::fresh_for(cell_type);
    }

    /// Turn a cell into empty AIR
    pub fn clear_cell(&mut self, index: usize) {
        self.set_cell(index, CellType::Air, 0);
        self.water[index] = 0;
        self.nutrient[index] = 0;
        self.energy[index] = 0;
    }

    /// Plant tissue kind, if the cell is a plant
    pub fn plant_state(&self, index: usize) -> Option<PlantState> {
        if self.cell_type[index] != CellType::Plant {
            return None;
        }
        PlantState::from_u8(self.state[index])
    }

    /// Soil class, if the cell is soil
    pub fn soil_state(&self, index: usize) -> Option<SoilState> {
        if self.cell_type[index] != CellType::Soil {
            return None;
        }
        SoilState::from_u8(self.state[index])
    }

    pub fn channel(&self, resource: Resource) -> &[u8] {
        match resource {
            Resource::Water => &self.water,
            Resource::Nutrient => &self.nutrient,
            Resource::Energy => &self.energy,
        }
    }

    pub fn channel_mut(&mut self, resource: Resource) -> &mut Vec<u8> {
        match resource {
            Resource::Water => &mut self.water,
            Resource::Nutrient => &mut self.nutrient,
            Resource::Energy => &mut self.energy,
        }
    }

    /// Move up to `amount` of a resource from `src` to `dst`
    ///
    /// A `loss` fraction of the moved amount disappears on the way, and `dst` is
    /// never filled past `cap`. Returns the amount that arrived. The sum of both
    /// cells never grows.
    pub fn transfer(
        &mut self,
        resource: Resource,
        src: usize,
        dst: usize,
        amount: u8,
        loss: f32,
        cap: u8,
    ) -> u8 {
        if src == dst || src >= self.size || dst >= self.size {
            return 0;
        }
        let channel = self.channel_mut(resource);
        let amount = amount.min(channel[src]);
        if amount == 0 {
            return 0;
        }
        let lost = ((amount as f32) * loss.clamp(0.0, 1.0)).floor() as u8;
        let room = cap.saturating_sub(channel[dst]);
        let delivered = (amount - lost).min(room);
        let taken = delivered.saturating_add(lost).min(amount);
        channel[src] -= taken;
        channel[dst] += delivered;
        delivered
    }

    /// Length of every channel, for corruption checks
    pub fn channel_lengths(&self) -> [(&'static str, usize); 7] {
        [
            ("type", self.cell_type.len()),
            ("state", self.state.len()),
            ("water", self.water.len()),
            ("nutrient", self.nutrient.len()),
            ("energy", self.energy.len()),
            ("metadata", self.metadata.len()),
            ("cloud", self.cloud.len()),
        ]
    }

    /// Total of a resource over the whole grid
    pub fn total(&self, resource: Resource) -> u64 {
        self.channel(resource).iter().map(|v| *v as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_and_coords() {
        let grid = Grid::new(10, 5);
        assert_eq!(grid.size(), 50);
        assert_eq!(grid.index(3, 2), Some(23));
        assert_eq!(grid.coords(23), Some((3, 2)));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(10, 0), None);
        assert_eq!(grid.index(0, 5), None);
        assert_eq!(grid.coords(50), None);
    }

    #[test]
    fn test_offset_clips_at_edges() {
        let grid = Grid::new(4, 4);
        assert_eq!(grid.below(0), Some(4));
        assert_eq!(grid.above(0), None);
        assert_eq!(grid.offset(3, 1, 0), None);
        assert_eq!(grid.below(15), None);
    }

    #[test]
    fn test_neighbors_corner_and_center() {
        let grid = Grid::new(5, 5);
        let corner = grid.neighbors(0, 0);
        assert_eq!(corner.len(), 3);
        assert_eq!(corner.iter().filter(|n| n.diagonal).count(), 1);

        let center = grid.neighbors(2, 2);
        assert_eq!(center.len(), 8);
        assert_eq!(center.iter().filter(|n| n.diagonal).count(), 4);
        for n in &center {
            assert_eq!(grid.index(n.x as i32, n.y as i32), Some(n.index));
        }
    }

    #[test]
    fn test_neighbors_never_out_of_bounds() {
        let grid = Grid::new(3, 2);
        for i in 0..grid.size() {
            for n in grid.neighbors_of(i) {
                assert!(n.index < grid.size());
                assert_ne!(n.index, i);
            }
        }
        assert!(grid.neighbors_of(99).is_empty());
    }

    #[test]
    fn test_swap_symmetry() {
        let mut grid = Grid::new(4, 4);
        grid.set_cell(1, CellType::Water, 0);
        grid.water[1] = 100;
        grid.metadata[1] = Metadata::Counter(7);
        grid.cloud[1] = 50;
        grid.set_cell(6, CellType::Soil, SoilState::Clay.as_u8());
        grid.nutrient[6] = 30;

        assert!(grid.swap_pixels(1, 6));
        assert_eq!(grid.cell_type[6], CellType::Water);
        assert_eq!(grid.water[6], 100);
        assert_eq!(grid.metadata[6], Metadata::Counter(7));
        assert_eq!(grid.cell_type[1], CellType::Soil);
        assert_eq!(grid.nutrient[1], 30);
        assert_eq!(grid.soil_state(1), Some(SoilState::Clay));
        assert_eq!(grid.cloud[6], 50);
        assert_eq!(grid.cloud[1], 0);

        // Swapping back restores the original layout
        assert!(grid.swap_pixels(6, 1));
        assert_eq!(grid.cell_type[1], CellType::Water);
        assert_eq!(grid.water[1], 100);
        assert_eq!(grid.cell_type[6], CellType::Soil);
        assert_eq!(grid.cloud[1], 50);
        assert_eq!(grid.cloud[6], 0);
    }

    #[test]
    fn test_swap_exchanges_cloud() {
        let mut grid = Grid::new(3, 3);
        grid.cloud[0] = 200;

        assert!(grid.swap_pixels(0, 1));
        assert_eq!(grid.cloud[0], 0);
        assert_eq!(grid.cloud[1], 200);

        assert!(grid.swap_pixels(0, 1));
        assert_eq!(grid.cloud[0], 200);
        assert_eq!(grid.cloud[1], 0);
    }

    #[test]
    fn test_swap_rejects_invalid() {
        let mut grid = Grid::new(2, 2);
        assert!(!grid.swap_pixels(0, 0));
        assert!(!grid.swap_pixels(0, 4));
        assert!(!grid.swap_pixels(9, 1));
    }

    #[test]
    fn test_set_cell_writes_fresh_metadata() {
        let mut grid = Grid::new(2, 2);
        grid.metadata[0] = Metadata::Counter(55);
        grid.water[0] = 10;
        grid.set_cell(0, CellType::Insect, 0);
        assert!(grid.metadata[0].insect().is_some());
        assert_eq!(grid.water[0], 10);

        grid.clear_cell(0);
        assert_eq!(grid.cell_type[0], CellType::Air);
        assert_eq!(grid.water[0], 0);
        assert_eq!(grid.metadata[0], Metadata::Counter(0));
    }

    #[test]
    fn test_typed_state_accessors() {
        let mut grid = Grid::new(2, 1);
        grid.set_cell(0, CellType::Plant, PlantState::Leaf.as_u8());
        assert_eq!(grid.plant_state(0), Some(PlantState::Leaf));
        assert_eq!(grid.soil_state(0), None);
        assert_eq!(grid.plant_state(1), None);
    }

    #[test]
    fn test_transfer_never_creates_resource() {
        let mut grid = Grid::new(2, 1);
        for (src_water, dst_water, amount, loss, cap) in [
            (100u8, 0u8, 50u8, 0.1f32, 255u8),
            (10, 250, 10, 0.0, 255),
            (255, 100, 255, 0.5, 200),
            (3, 0, 3, 0.9, 255),
            (0, 0, 10, 0.0, 255),
        ] {
            grid.water[0] = src_water;
            grid.water[1] = dst_water;
            let before = grid.water[0] as u32 + grid.water[1] as u32;
            let delivered = grid.transfer(Resource::Water, 0, 1, amount, loss, cap);
            let after = grid.water[0] as u32 + grid.water[1] as u32;
            assert!(after <= before);
            assert!(grid.water[1] <= cap.max(dst_water));
            assert_eq!(grid.water[1], dst_water + delivered);
        }
    }

    #[test]
    fn test_transfer_applies_loss() {
        let mut grid = Grid::new(2, 1);
        grid.nutrient[0] = 100;
        let delivered = grid.transfer(Resource::Nutrient, 0, 1, 50, 0.1, 255);
        assert_eq!(delivered, 45);
        assert_eq!(grid.nutrient[0], 50);
        assert_eq!(grid.nutrient[1], 45);
    }

    #[test]
    fn test_channel_lengths_match_size() {
        let grid = Grid::new(7, 3);
        for (_, len) in grid.channel_lengths() {
            assert_eq!(len, 21);
        }
    }
}
