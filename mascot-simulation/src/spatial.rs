use crate::geometry::Vec2;
use crate::mascot::Mascot;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Uniform grid over mascot centers, rebuilt every frame. Buckets hold
/// indices into the manager's mascot list.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    base_cell_size: f32,
    cell_size: f32,
    grid: HashMap<(i32, i32), SmallVec<[usize; 8]>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 150.0 };
        SpatialGrid {
            base_cell_size: cell_size,
            cell_size,
            grid: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Get the grid cell coordinates for a point
    fn get_cell(&self, point: Vec2) -> (i32, i32) {
        let x = (point.x / self.cell_size).floor() as i32;
        let y = (point.y / self.cell_size).floor() as i32;
        (x, y)
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Disabled mascots are never indexed.
    pub fn insert(&mut self, index: usize, mascot: &Mascot) {
        if !mascot.is_active() {
            return;
        }
        let cell = self.get_cell(mascot.center());
        self.grid.entry(cell).or_default().push(index);
    }

    /// Clears and re-indexes. Cells grow to the largest active collision
    /// diameter so that any colliding pair is at most one cell apart.
    pub fn rebuild(&mut self, mascots: &[Mascot]) {
        self.clear();
        let largest = mascots
            .iter()
            .filter(|m| m.is_active())
            .map(|m| m.radius() * 2.0)
            .fold(0.0_f32, f32::max);
        self.cell_size = self.base_cell_size.max(largest);

        for (index, mascot) in mascots.iter().enumerate() {
            self.insert(index, mascot);
        }
    }

    /// Indices in the mascot's cell and the 8 around it, the mascot itself
    /// included when indexed. Callers filter with the exact collision test.
    pub fn query_neighbors(&self, mascot: &Mascot) -> SmallVec<[usize; 16]> {
        let (cx, cy) = self.get_cell(mascot.center());
        let mut result = SmallVec::new();
        for x_offset in -1..=1 {
            for y_offset in -1..=1 {
                if let Some(indices) = self.grid.get(&(cx + x_offset, cy + y_offset)) {
                    result.extend(indices.iter().copied());
                }
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.grid.values().map(|cell| cell.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}
