//! Active-pixel sets
//!
//! `current` is iterated during a tick while rules fill `next`. Both are dense
//! index sets: an insertion-ordered list plus a membership bitmap.

use terrarium_simulation::{CELL_TYPE_COUNT, CellType};

use super::rng_trait::WorldRng;

/// Duplicate-free set of cell indices with O(1) insert and lookup
#[derive(Clone, Debug, Default)]
pub struct PixelSet {
    members: Vec<usize>,
    present: Vec<bool>,
}

impl PixelSet {
    pub fn new(size: usize) -> Self {
        Self {
            members: Vec::new(),
            present: vec![false; size],
        }
    }

    /// Insert an index; returns false if it was already present or out of range
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        match self.present.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                self.members.push(index);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.present.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.members
    }

    pub fn clear(&mut self) {
        for index in self.members.drain(..) {
            self.present[index] = false;
        }
    }

    /// Replace the contents with `keep`, which must hold in-range indices
    fn replace(&mut self, keep: Vec<usize>) {
        self.clear();
        for index in keep {
            self.insert(index);
        }
    }

    /// Shrink the set to at most `cap` members
    ///
    /// Members are ranked by cell type (see [`CellType::prune_rank`]). Whole
    /// classes are kept in rank order; the class that straddles the cap is sampled
    /// at random and everything ranked below it is dropped. Returns the number of
    /// removed members.
    pub fn prune<R: WorldRng + ?Sized>(
        &mut self,
        cap: usize,
        cell_types: &[CellType],
        rng: &mut R,
    ) -> usize {
        let len = self.members.len();
        if len <= cap {
            return 0;
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); CELL_TYPE_COUNT];
        for &index in &self.members {
            let rank = cell_types
                .get(index)
                .map(|t| t.prune_rank() as usize)
                .unwrap_or(CELL_TYPE_COUNT - 1);
            buckets[rank].push(index);
        }

        let mut keep = Vec::with_capacity(cap);
        for mut bucket in buckets {
            let room = cap - keep.len();
            if room == 0 {
                break;
            }
            if bucket.len() <= room {
                keep.append(&mut bucket);
            } else {
                partial_shuffle(&mut bucket, room, rng);
                keep.extend_from_slice(&bucket[..room]);
            }
        }

        self.replace(keep);
        len - self.members.len()
    }
}

/// Move a uniform random sample of `amount` items to the front of `items`
fn partial_shuffle<T, R: WorldRng + ?Sized>(items: &mut [T], amount: usize, rng: &mut R) {
    let len = items.len();
    for i in 0..amount.min(len) {
        let j = i + rng.gen_index(len - i);
        items.swap(i, j);
    }
}

/// Double-buffered active sets
#[derive(Clone, Debug)]
pub struct ActivePixels {
    pub current: PixelSet,
    pub next: PixelSet,
}

impl ActivePixels {
    pub fn new(size: usize) -> Self {
        Self {
            current: PixelSet::new(size),
            next: PixelSet::new(size),
        }
    }

    /// `current = next; next = ∅`
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();
    }
}
