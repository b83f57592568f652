//! Colour endpoint fitting.
//!
//! Every fit produces a pair of 565 endpoint words plus one palette index per
//! block slot, and reports the weighted squared error of the palette the
//! decoder will actually reconstruct.

mod cluster;
mod range;
mod single;
mod single_lut;

use glam::Vec3;

pub use self::cluster::ClusterFit;
pub use self::range::RangeFit;
pub use self::single::SingleColourFit;

use crate::dxt::colour_block::{palette, write_colour_block4};
use crate::dxt::{ColourSet, Metric};

/// Result of fitting a colour set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FittedColours {
    pub start: u16,
    pub end: u16,
    /// One palette index per block slot, raster order.
    pub indices: [u8; 16],
    /// Weighted squared reconstruction error on the 0–255 scale.
    pub error: f32,
}

impl FittedColours {
    /// Encodes the fit as a 4-colour block.
    pub fn to_block(&self) -> [u8; 8] {
        write_colour_block4(self.start, self.end, &self.indices)
    }
}

pub trait ColourFit {
    fn fit(&self) -> FittedColours;

    fn compress(&self) -> [u8; 8] {
        self.fit().to_block()
    }
}

/// Decoded 4-colour palette as points on the 0–255 scale.
pub(crate) fn palette_points(start: u16, end: u16) -> [Vec3; 4] {
    palette(start, end, false).map(|[r, g, b, _]| Vec3::new(r as f32, g as f32, b as f32))
}

/// Assigns every point to its nearest palette entry under the metric.
pub(crate) fn fit_endpoints(colours: &ColourSet, metric: Metric, start: u16, end: u16) -> FittedColours {
    let codes = palette_points(start, end);

    let mut closest = [0u8; 16];
    let mut error = 0.0;
    for (i, (&point, &weight)) in colours.points().iter().zip(colours.weights()).enumerate() {
        let mut least = f32::INFINITY;
        for (j, &code) in codes.iter().enumerate() {
            let dist = metric.distance(code, point);
            if dist < least {
                least = dist;
                closest[i] = j as u8;
            }
        }
        error += weight * least;
    }

    FittedColours {
        start,
        end,
        indices: colours.remap_indices(&closest),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dxt::Flags;

    #[test]
    fn test_fit_endpoints_picks_nearest_entry() {
        let mut rgba = [255u8; 64];
        for pixel in rgba.chunks_exact_mut(4).skip(8) {
            pixel.copy_from_slice(&[0, 0, 0, 255]);
        }
        let set = ColourSet::new(&rgba, 0xffff, Flags::DXT1);

        let fitted = fit_endpoints(&set, Metric::UNIFORM, 0xffff, 0x0000);
        assert_eq!(&fitted.indices[..8], &[0; 8]);
        assert_eq!(&fitted.indices[8..], &[1; 8]);
        assert_eq!(fitted.error, 0.0);

        let block = fitted.to_block();
        assert_eq!(&block[..4], &[0xff, 0xff, 0x00, 0x00]);
        assert_eq!(&block[4..], &[0x00, 0x00, 0x55, 0x55]);
    }

    #[test]
    fn test_palette_points() {
        let codes = palette_points(0xffff, 0x0000);
        assert_eq!(codes[2], Vec3::splat(170.0));
        assert_eq!(codes[3], Vec3::splat(85.0));
    }
}
