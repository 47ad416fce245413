//! Three-generation history ring for main-frame snapshots.
//!
//! The ring is an arena of three slots plus a generation-to-slot table.
//! Rotation only permutes indices; snapshots are never copied.

/// Generations kept: current, previous, previous-previous
pub const HISTORY_GENERATIONS: usize = 3;

/// Arena of [`HISTORY_GENERATIONS`] snapshots.
#[derive(Debug, Clone)]
pub struct HistoryRing<T> {
    slots: [T; HISTORY_GENERATIONS],
    /// `generations[n]` is the slot holding generation `n`
    generations: [usize; HISTORY_GENERATIONS],
}

impl<T: Default> HistoryRing<T> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| T::default()),
            generations: [0, 1, 2],
        }
    }
}

impl<T: Default> Default for HistoryRing<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryRing<T> {
    /// Slot producers write the next frame into (generation 0)
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.slots[self.generations[0]]
    }

    pub fn current(&self) -> &T {
        &self.slots[self.generations[0]]
    }

    /// Generation `n` (0 = current). Panics if `n >= 3`.
    pub fn generation(&self, n: usize) -> &T {
        &self.slots[self.generations[n]]
    }

    /// After an intra frame both older generations refer to the frame just
    /// written, so the next inter frame predicts from it alone.
    pub fn rotate_after_intra(&mut self) {
        let written = self.generations[0];
        let next = (written + 1) % HISTORY_GENERATIONS;
        self.generations = [next, written, written];
    }

    /// Shift every generation back by one and reuse the oldest slot.
    pub fn rotate_after_inter(&mut self) {
        let [g0, g1, _] = self.generations;
        let next = (g0 + 1) % HISTORY_GENERATIONS;
        self.generations = [next, g0, g1];
    }

    /// Point the generations back at distinct slots.
    pub fn reset(&mut self) {
        self.generations = [0, 1, 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(ring: &mut HistoryRing<i32>, value: i32) {
        *ring.current_mut() = value;
    }

    #[test]
    fn test_intra_then_inter_rotation() {
        let mut ring: HistoryRing<i32> = HistoryRing::new();

        write(&mut ring, 10);
        ring.rotate_after_intra();
        assert_eq!(*ring.generation(1), 10);
        assert_eq!(*ring.generation(2), 10);

        write(&mut ring, 11);
        assert_eq!(*ring.generation(0), 11);
        assert_eq!(*ring.generation(1), 10, "current slot must not alias history");
        ring.rotate_after_inter();
        assert_eq!(*ring.generation(1), 11);
        assert_eq!(*ring.generation(2), 10);

        write(&mut ring, 12);
        ring.rotate_after_inter();
        assert_eq!(*ring.generation(1), 12);
        assert_eq!(*ring.generation(2), 11);
    }

    #[test]
    fn test_current_slot_is_free_after_every_rotation() {
        let mut ring: HistoryRing<i32> = HistoryRing::new();
        for step in 0..20 {
            if step % 5 == 0 {
                ring.rotate_after_intra();
            } else {
                ring.rotate_after_inter();
            }
            let [g0, g1, g2] = ring.generations;
            assert_ne!(g0, g1);
            assert_ne!(g0, g2);
        }
    }

    #[test]
    fn test_reset() {
        let mut ring: HistoryRing<i32> = HistoryRing::new();
        ring.rotate_after_intra();
        ring.reset();
        assert_eq!(ring.generations, [0, 1, 2]);
    }
}
