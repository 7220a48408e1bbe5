//! RNG trait abstraction for the simulation rules
//!
//! Rules take any `WorldRng`, so the driver can hand them a seeded
//! `Xoshiro256StarStar` while tests use their own seeds.

/// Random number generator trait for the simulation rules
pub trait WorldRng {
    /// Generate random boolean with 50% probability
    fn gen_bool(&mut self) -> bool;

    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    fn gen_index(&mut self, len: usize) -> usize {
        ((self.gen_f32() * len as f32) as usize).min(len.saturating_sub(1))
    }

    /// Uniform integer in `lo..=hi`
    fn gen_range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        lo + self.gen_index((hi - lo + 1) as usize) as i32
    }

    /// -1 or 1
    fn gen_sign(&mut self) -> i32 {
        if self.gen_bool() { -1 } else { 1 }
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn gen_bool(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }

    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }

    fn gen_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::Rng::gen_range(self, 0..len)
    }

    fn gen_range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        rand::Rng::gen_range(self, lo..=hi)
    }
}

/// Pick a random element
pub fn choose<'a, T, R: WorldRng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.gen_index(items.len())])
    }
}

/// Pick an index with probability proportional to its weight
///
/// Returns `None` when every weight is zero or negative.
pub fn weighted_choice<R: WorldRng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.gen_f32() * total;
    let mut last = None;
    for (i, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        if roll < weight {
            return Some(i);
        }
        roll -= weight;
        last = Some(i);
    }
    // Float rounding can leave a sliver past the final bucket
    last
}

/// In-place Fisher-Yates shuffle
pub fn shuffle<T, R: WorldRng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_index(i + 1);
        items.swap(i, j);
    }
}
