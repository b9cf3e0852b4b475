// Occupancy bookkeeping for the cloud canvas.
// A summed-area table answers "is this rectangle empty?" in O(1), so every top-left
// position can be checked when placing a word.

pub struct OccupancyMap {
    width: u32,
    height: u32,
    occupied: Vec<bool>,
    // (width + 1) x (height + 1), integral[y][x] = occupied cells above-left of (x, y)
    integral: Vec<u32>,
}

impl OccupancyMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            occupied: vec![false; (width * height) as usize],
            integral: vec![0; ((width + 1) * (height + 1)) as usize],
        }
    }

    fn sum_at(&self, x: u32, y: u32) -> u32 {
        self.integral[(y * (self.width + 1) + x) as usize]
    }

    /// Whether the `w` x `h` rectangle at (`x`, `y`) lies on the canvas and is empty.
    pub fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        if w == 0 || h == 0 || x + w > self.width || y + h > self.height {
            return false;
        }
        let total = self.sum_at(x + w, y + h) + self.sum_at(x, y)
            - self.sum_at(x + w, y)
            - self.sum_at(x, y + h);
        total == 0
    }

    pub fn mark(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for row in y..y_end {
            for col in x..x_end {
                self.occupied[(row * self.width + col) as usize] = true;
            }
        }
        if x < self.width && y < self.height {
            self.update_from(x, y);
        }
    }

    // Only sums below and right of (x, y) change. Each row restarts its running sum from
    // the unchanged prefix left of `x`.
    fn update_from(&mut self, x: u32, y: u32) {
        let stride = (self.width + 1) as usize;
        let x = x as usize;
        for row in y as usize..self.height as usize {
            let mut run = self.integral[(row + 1) * stride + x] - self.integral[row * stride + x];
            for col in x..self.width as usize {
                if self.occupied[row * self.width as usize + col] {
                    run += 1;
                }
                let above = self.integral[row * stride + col + 1];
                self.integral[(row + 1) * stride + col + 1] = above + run;
            }
        }
    }

    /// The free top-left position for a `w` x `h` box closest to the canvas centre.
    ///
    /// Every position is checked, so a hole just big enough is found wherever it is.
    /// Horizontal distance is scaled down by the aspect ratio; ties go to the first
    /// position in row-major order.
    pub fn find_position(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w == 0 || h == 0 || w > self.width || h > self.height {
            return None;
        }
        let aspect = self.width as f64 / self.height as f64;
        let cx = (self.width - w) as f64 / 2.0;
        let cy = (self.height - h) as f64 / 2.0;

        let mut best: Option<((u32, u32), f64)> = None;
        for y in 0..=self.height - h {
            let dy = y as f64 - cy;
            for x in 0..=self.width - w {
                let dx = (x as f64 - cx) / aspect;
                let distance = dx * dx + dy * dy;
                if best.map_or(false, |(_, d)| distance >= d) {
                    continue;
                }
                if self.is_free(x, y, w, h) {
                    best = Some(((x, y), distance));
                }
            }
        }
        best.map(|(spot, _)| spot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_places_in_centre() {
        let map = OccupancyMap::new(100, 50);
        assert_eq!(map.find_position(20, 10), Some((40, 20)));
    }

    #[test]
    fn test_marked_area_is_not_free() {
        let mut map = OccupancyMap::new(100, 50);
        map.mark(40, 20, 20, 10);
        assert!(!map.is_free(40, 20, 20, 10));
        assert!(!map.is_free(55, 25, 10, 10));
        assert!(map.is_free(0, 0, 40, 20));
        assert!(map.is_free(60, 30, 40, 20));
    }

    #[test]
    fn test_second_box_avoids_first() {
        let mut map = OccupancyMap::new(100, 50);
        let (x, y) = map.find_position(20, 10).unwrap();
        map.mark(x, y, 20, 10);
        let (x2, y2) = map.find_position(20, 10).unwrap();
        let overlaps = x2 < x + 20 && x < x2 + 20 && y2 < y + 10 && y < y2 + 10;
        assert!(!overlaps);
    }

    #[test]
    fn test_too_large_box_has_no_position() {
        let map = OccupancyMap::new(100, 50);
        assert_eq!(map.find_position(101, 10), None);
        assert!(!map.is_free(90, 0, 20, 10));
    }

    // everything marked except a `size` x `size` hole at (hx, hy)
    fn map_with_hole(hx: u32, hy: u32, size: u32) -> OccupancyMap {
        let mut map = OccupancyMap::new(800, 400);
        map.mark(0, 0, 800, hy);
        map.mark(0, hy + size, 800, 400 - hy - size);
        map.mark(0, hy, hx, size);
        map.mark(hx + size, hy, 800 - hx - size, size);
        map
    }

    #[test]
    fn test_isolated_hole_is_found() {
        let holes = [(0, 0), (0, 29), (776, 376), (400, 0), (13, 200), (600, 311), (388, 188)];
        for (hx, hy) in holes {
            let map = map_with_hole(hx, hy, 24);
            let (x, y) = map
                .find_position(20, 20)
                .unwrap_or_else(|| panic!("hole at ({}, {}) not found", hx, hy));
            assert!(x >= hx && x + 20 <= hx + 24, "x {} outside hole at {}", x, hx);
            assert!(y >= hy && y + 20 <= hy + 24, "y {} outside hole at {}", y, hy);
            assert_eq!(map.find_position(25, 20), None);
        }
    }

    #[test]
    fn test_closest_free_position_wins() {
        let mut map = OccupancyMap::new(100, 50);
        map.mark(30, 10, 40, 30);
        // 20 px left of the block weighs as 10 on a 2:1 canvas, so it beats 20 px above
        assert_eq!(map.find_position(20, 10), Some((10, 20)));
        map.mark(0, 0, 30, 50);
        map.mark(70, 0, 30, 50);
        // above and below tie; row-major order picks the top
        assert_eq!(map.find_position(20, 10), Some((40, 0)));
    }

    #[test]
    fn test_sums_match_cells_after_many_marks() {
        let mut map = OccupancyMap::new(37, 23);
        let marks = [(5, 3, 7, 4), (0, 10, 3, 3), (20, 0, 17, 2), (30, 15, 10, 10), (11, 9, 1, 1), (2, 1, 4, 20)];
        for (x, y, w, h) in marks {
            map.mark(x, y, w, h);
        }
        for y in 0..=map.height {
            for x in 0..=map.width {
                let expected = (0..y)
                    .flat_map(|row| (0..x).map(move |col| (row, col)))
                    .filter(|&(row, col)| map.occupied[(row * map.width + col) as usize])
                    .count() as u32;
                assert_eq!(map.sum_at(x, y), expected, "sum at ({}, {})", x, y);
            }
        }
        assert!(!map.is_free(36, 22, 1, 1));
        assert!(map.is_free(12, 9, 8, 1));
    }

    #[test]
    fn test_full_map_has_no_position() {
        let mut map = OccupancyMap::new(30, 20);
        map.mark(0, 0, 30, 20);
        assert_eq!(map.find_position(1, 1), None);
    }
}
