//! # Height Field
//!
//! The terrain is a fixed N×N grid of column heights. A column of height `h`
//! is a stack of `h` unit cubes at levels `0..h`; there are no empty columns.
//!
//! Heights are produced once per session from 2D simplex noise and from then on
//! only change through the block editor.

use log::{debug, info};
use noise::{NoiseFn, Simplex};

use crate::{
    config::WorldConfig,
    error::{ViewerError, ViewerResult},
};

/// A square grid of per-column block counts.
///
/// Columns are addressed as `(x, z)` with both coordinates in `0..size`.
/// Every stored height lies in `[min_height, max_height]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightField {
    /// Edge length of the grid
    size: usize,
    /// Current heights, indexed `x * size + z`
    heights: Vec<u8>,
    /// Heights as first generated, used by [`HeightField::reset`]
    original: Vec<u8>,
    /// Lowest allowed column height (at least 1)
    min_height: u8,
    /// Highest allowed column height
    max_height: u8,
}

impl HeightField {
    /// Generates a height field from simplex noise seeded with `seed`.
    ///
    /// # Arguments
    /// * `config` - Grid size, noise scale/amplitude, baseline and height bounds
    /// * `seed` - Noise seed; the same seed always yields the same terrain
    ///
    /// # Errors
    /// Returns an error if the configured grid size is zero or the height bounds
    /// are inverted or allow empty columns.
    pub fn generate(config: &WorldConfig, seed: u32) -> ViewerResult<Self> {
        let noise = Simplex::new(seed);
        let field = Self::generate_with(config, &noise)?;
        info!(
            "Generated {0}x{0} height field (seed {seed}, {1} cubes)",
            field.size,
            field.cube_count()
        );
        Ok(field)
    }

    /// Generates a height field from any 2D noise function.
    ///
    /// Each cell samples `noise` at `(x * scale, z * scale)`, scales the sample by
    /// the amplitude, floors it, adds the baseline and clamps the result into the
    /// height bounds. Out-of-range samples are clamped, never rejected.
    ///
    /// # Errors
    /// Returns an error if the configured grid size is zero or the height bounds
    /// are inverted or allow empty columns.
    pub fn generate_with<N: NoiseFn<f64, 2>>(config: &WorldConfig, noise: &N) -> ViewerResult<Self> {
        validate_bounds(config.size, config.min_height, config.max_height)?;

        let size = config.size;
        let mut heights = Vec::with_capacity(size * size);
        for x in 0..size {
            for z in 0..size {
                let sample = noise.get([
                    x as f64 * config.noise_scale,
                    z as f64 * config.noise_scale,
                ]);
                let raw = (config.noise_amplitude * sample).floor() + f64::from(config.baseline);
                heights.push(clamp_height(raw, config.min_height, config.max_height));
            }
        }

        Ok(Self {
            size,
            original: heights.clone(),
            heights,
            min_height: config.min_height,
            max_height: config.max_height,
        })
    }

    /// Builds a height field from explicit rows, where `rows[x][z]` is a column height.
    ///
    /// # Errors
    /// Returns [`ViewerError::InvalidGridSize`] if the rows are empty or not square,
    /// and [`ViewerError::InvalidHeight`] if any height is outside the bounds.
    pub fn from_heights(rows: &[Vec<u8>], min_height: u8, max_height: u8) -> ViewerResult<Self> {
        let size = rows.len();
        validate_bounds(size, min_height, max_height)?;
        if rows.iter().any(|row| row.len() != size) {
            return Err(ViewerError::InvalidGridSize { rows: size });
        }

        let mut heights = Vec::with_capacity(size * size);
        for (x, row) in rows.iter().enumerate() {
            for (z, &height) in row.iter().enumerate() {
                if !(min_height..=max_height).contains(&height) {
                    return Err(ViewerError::InvalidHeight {
                        x,
                        z,
                        height,
                        min: min_height,
                        max: max_height,
                    });
                }
                heights.push(height);
            }
        }

        Ok(Self {
            size,
            original: heights.clone(),
            heights,
            min_height,
            max_height,
        })
    }

    /// Edge length N of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Lowest allowed column height.
    pub fn min_height(&self) -> u8 {
        self.min_height
    }

    /// Highest allowed column height.
    pub fn max_height(&self) -> u8 {
        self.max_height
    }

    /// Returns `true` if `(x, z)` names a column inside the grid.
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.size && (z as usize) < self.size
    }

    /// Height of the column at `(x, z)`, or `None` outside the grid.
    pub fn height(&self, x: i32, z: i32) -> Option<u8> {
        self.index(x, z).map(|i| self.heights[i])
    }

    /// Height the column at `(x, z)` had when the field was created.
    pub fn original_height(&self, x: i32, z: i32) -> Option<u8> {
        self.index(x, z).map(|i| self.original[i])
    }

    /// Returns `true` if the voxel at grid level `y` of column `(x, z)` is filled.
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        y >= 0 && self.height(x, z).is_some_and(|h| y < h as i32)
    }

    /// Adds one cube on top of the column at `(x, z)`.
    ///
    /// # Returns
    /// `true` if the column grew; `false` if it is outside the grid or already at
    /// the height cap.
    pub fn raise(&mut self, x: i32, z: i32) -> bool {
        let Some(i) = self.index(x, z) else {
            return false;
        };
        if self.heights[i] >= self.max_height {
            debug!("Column ({x}, {z}) already at max height {}", self.max_height);
            return false;
        }
        self.heights[i] += 1;
        true
    }

    /// Removes the top cube of the column at `(x, z)`.
    ///
    /// # Returns
    /// `true` if the column shrank; `false` if it is outside the grid or already
    /// at the height floor.
    pub fn lower(&mut self, x: i32, z: i32) -> bool {
        let Some(i) = self.index(x, z) else {
            return false;
        };
        if self.heights[i] <= self.min_height {
            debug!("Column ({x}, {z}) already at min height {}", self.min_height);
            return false;
        }
        self.heights[i] -= 1;
        true
    }

    /// Restores every column to its generated height.
    ///
    /// # Returns
    /// `true` if any column changed.
    pub fn reset(&mut self) -> bool {
        if self.heights == self.original {
            return false;
        }
        self.heights.copy_from_slice(&self.original);
        true
    }

    /// Total number of cubes across all columns.
    pub fn cube_count(&self) -> usize {
        self.heights.iter().map(|&h| h as usize).sum()
    }

    /// Iterates over `(x, z, height)` in row order (x outer, z inner).
    pub fn columns(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.heights
            .iter()
            .enumerate()
            .map(move |(i, &h)| (i / self.size, i % self.size, h))
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        self.contains(x, z)
            .then(|| x as usize * self.size + z as usize)
    }
}

/// Clamps a raw sample into `[min, max]`. Computed in `f64` so extreme amplitudes
/// and baselines saturate instead of overflowing; NaN maps to `min`.
fn clamp_height(raw: f64, min: u8, max: u8) -> u8 {
    if raw.is_nan() {
        return min;
    }
    raw.clamp(f64::from(min), f64::from(max)) as u8
}

fn validate_bounds(size: usize, min_height: u8, max_height: u8) -> ViewerResult<()> {
    if size == 0 {
        return Err(ViewerError::InvalidGridSize { rows: 0 });
    }
    if min_height == 0 || min_height > max_height {
        return Err(ViewerError::Config(format!(
            "height bounds [{min_height}, {max_height}] must satisfy 1 <= min <= max"
        )));
    }
    Ok(())
}
