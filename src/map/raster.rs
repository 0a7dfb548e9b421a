use rayon::prelude::*;

/// Shape owning each terminal cell of the map area, as last rasterized.
///
/// This is what the surface shows, so it doubles as the hit buffer for
/// per-shape pointer events.
pub struct Raster {
    key: RasterKey,
    cols: u16,
    rows: u16,
    owners: Vec<Option<u32>>,
}

/// Everything a raster depends on
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RasterKey {
    pub viewport: (u64, u64, u64, usize, usize),
    pub generation: u64,
    pub z_generation: u64,
}

impl Raster {
    /// Fill `cols` x `rows` cells in parallel, one row per task
    pub fn build<F>(key: RasterKey, cols: u16, rows: u16, owner_at: F) -> Self
    where
        F: Fn(u16, u16) -> Option<usize> + Sync,
    {
        let mut owners = vec![None; cols as usize * rows as usize];
        if cols > 0 {
            owners
                .par_chunks_mut(cols as usize)
                .enumerate()
                .for_each(|(row, out)| {
                    for (col, slot) in out.iter_mut().enumerate() {
                        *slot = owner_at(col as u16, row as u16).map(|idx| idx as u32);
                    }
                });
        }
        Self {
            key,
            cols,
            rows,
            owners,
        }
    }

    pub fn key(&self) -> RasterKey {
        self.key
    }

    pub fn owner(&self, col: u16, row: u16) -> Option<usize> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.owners[row as usize * self.cols as usize + col as usize].map(|idx| idx as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RasterKey {
        RasterKey {
            viewport: (0, 0, 0, 0, 0),
            generation: 0,
            z_generation: 0,
        }
    }

    #[test]
    fn test_owner_lookup_matches_builder() {
        let raster = Raster::build(key(), 4, 3, |col, row| {
            if col < 2 && row > 0 {
                Some(7)
            } else {
                None
            }
        });
        assert_eq!(raster.owner(0, 0), None);
        assert_eq!(raster.owner(1, 2), Some(7));
        assert_eq!(raster.owner(3, 2), None);
        assert_eq!(raster.owner(9, 9), None);
    }

    #[test]
    fn test_empty_raster() {
        let raster = Raster::build(key(), 0, 5, |_, _| Some(1));
        assert_eq!(raster.owner(0, 0), None);
    }
}
