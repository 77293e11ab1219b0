//! Precomputed disk of tile offsets for a visibility radius.

/// Euclidean disk membership used by every range check in the crate.
pub fn is_within_range(dx: i32, dy: i32, range: f32) -> bool {
    if !range.is_finite() || range < 0.0 {
        return dx == 0 && dy == 0;
    }
    let dx = f64::from(dx);
    let dy = f64::from(dy);
    let range = f64::from(range);
    dx * dx + dy * dy <= range * range
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityPattern {
    range: f32,
    offsets: Vec<(i32, i32)>,
}

impl VisibilityPattern {
    pub fn generate(range: f32) -> Self {
        if !range.is_finite() || range < 0.0 {
            return Self {
                range,
                offsets: vec![(0, 0)],
            };
        }

        let extent = range.ceil() as i32;
        let side = (2 * extent + 1) as usize;
        let mut offsets = Vec::with_capacity(side * side);
        for dy in -extent..=extent {
            for dx in -extent..=extent {
                if is_within_range(dx, dy, range) {
                    offsets.push((dx, dy));
                }
            }
        }
        offsets.sort_by_key(|&(dx, dy)| dx * dx + dy * dy);

        Self { range, offsets }
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn contains_offset(&self, dx: i32, dy: i32) -> bool {
        is_within_range(dx, dy, self.range)
    }
}

/// Keeps the last generated pattern and regenerates only when the range value changes.
#[derive(Debug, Default)]
pub struct PatternCache {
    cached: Option<VisibilityPattern>,
    generations: u64,
}

impl PatternCache {
    pub fn get(&mut self, range: f32) -> &VisibilityPattern {
        let stale = match &self.cached {
            Some(pattern) => pattern.range.to_bits() != range.to_bits(),
            None => true,
        };
        if stale {
            self.generations = self.generations.saturating_add(1);
        }
        let pattern = match self.cached.take() {
            Some(pattern) if !stale => pattern,
            _ => VisibilityPattern::generate(range),
        };
        self.cached.insert(pattern)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn generations(&self) -> u64 {
        self.generations
    }
}
