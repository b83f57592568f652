use glam::Vec3;

use crate::dxt::Flags;

/// The distinct colours of a block's visible pixels.
///
/// Each point keeps its RGB value on the 0–255 scale and an accumulated
/// weight: one per pixel, or alpha/255 per pixel when colour is weighted by
/// alpha. `remap` records which point every block slot maps to, with `None`
/// for slots outside the validity mask.
#[derive(Clone, Debug)]
pub struct ColourSet {
    count: usize,
    colours: [[u8; 3]; 16],
    points: [Vec3; 16],
    weights: [f32; 16],
    remap: [Option<u8>; 16],
}

impl ColourSet {
    /// Builds the set from 16 RGBA pixels in raster order.
    ///
    /// Bit `i` of `mask` marks pixel `i` as present in the source image.
    pub fn new(rgba: &[u8; 64], mask: u16, flags: Flags) -> Self {
        let weight_by_alpha = flags.weight_colour_by_alpha();

        let mut set = Self {
            count: 0,
            colours: [[0; 3]; 16],
            points: [Vec3::ZERO; 16],
            weights: [0.0; 16],
            remap: [None; 16],
        };

        for (i, pixel) in rgba.chunks_exact(4).enumerate() {
            if mask & (1 << i) == 0 {
                continue;
            }

            let colour = [pixel[0], pixel[1], pixel[2]];
            let weight = if weight_by_alpha {
                pixel[3] as f32 / 255.0
            } else {
                1.0
            };

            match set.colours[..set.count].iter().position(|&c| c == colour) {
                Some(existing) => {
                    set.weights[existing] += weight;
                    set.remap[i] = Some(existing as u8);
                }
                None => {
                    let index = set.count;
                    set.colours[index] = colour;
                    set.points[index] = Vec3::new(
                        colour[0] as f32,
                        colour[1] as f32,
                        colour[2] as f32,
                    );
                    set.weights[index] = weight;
                    set.remap[i] = Some(index as u8);
                    set.count += 1;
                }
            }
        }

        set
    }

    /// Number of distinct colours; zero when every pixel is masked out.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points[..self.count]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights[..self.count]
    }

    pub fn colours(&self) -> &[[u8; 3]] {
        &self.colours[..self.count]
    }

    /// Point index of a block slot, or `None` if the slot is masked out.
    pub fn point_of(&self, pixel: usize) -> Option<usize> {
        self.remap[pixel].map(usize::from)
    }

    /// Pixel slots represented by a point.
    pub fn pixels_of(&self, point: usize) -> impl Iterator<Item = usize> + '_ {
        (0..16).filter(move |&pixel| self.point_of(pixel) == Some(point))
    }

    /// Expands per-point palette indices into per-pixel indices.
    ///
    /// Masked-out slots get index 3; their value is never read back.
    pub fn remap_indices(&self, source: &[u8]) -> [u8; 16] {
        let mut target = [3u8; 16];
        for (pixel, index) in target.iter_mut().enumerate() {
            if let Some(point) = self.point_of(pixel) {
                *index = source[point];
            }
        }
        target
    }
}
