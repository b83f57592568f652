use crate::dxt::colour_block::pack_565;
use crate::dxt::fit::{ColourFit, FittedColours, fit_endpoints};
use crate::dxt::maths::principal_axis;
use crate::dxt::{ColourSet, Flags, Metric};

/// Fast fit: the endpoints are the points with the extreme projections onto
/// the principal axis.
pub struct RangeFit<'a> {
    colours: &'a ColourSet,
    metric: Metric,
}

impl<'a> RangeFit<'a> {
    pub fn new(colours: &'a ColourSet, flags: Flags) -> Self {
        Self::with_metric(colours, Metric::from_flags(flags))
    }

    pub(super) fn with_metric(colours: &'a ColourSet, metric: Metric) -> Self {
        Self { colours, metric }
    }
}

impl ColourFit for RangeFit<'_> {
    fn fit(&self) -> FittedColours {
        let points = self.colours.points();
        let Some(&first) = points.first() else {
            return fit_endpoints(self.colours, self.metric, 0, 0);
        };

        let axis = principal_axis(points, self.colours.weights());

        let mut start = first;
        let mut end = first;
        let mut min = first.dot(axis);
        let mut max = min;
        for &point in &points[1..] {
            let projection = point.dot(axis);
            if projection < min {
                start = point;
                min = projection;
            } else if projection > max {
                end = point;
                max = projection;
            }
        }

        fit_endpoints(self.colours, self.metric, pack_565(start), pack_565(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dxt::colour_block::decompress_colour;

    fn two_colour_block(a: [u8; 3], b: [u8; 3]) -> [u8; 64] {
        let mut rgba = [0u8; 64];
        for (i, pixel) in rgba.chunks_exact_mut(4).enumerate() {
            let c = if (i / 4 + i) % 2 == 0 { a } else { b };
            pixel.copy_from_slice(&[c[0], c[1], c[2], 255]);
        }
        rgba
    }

    #[test]
    fn test_two_exact_colours_round_trip() {
        let rgba = two_colour_block([255, 0, 0], [0, 0, 255]);
        let set = ColourSet::new(&rgba, 0xffff, Flags::DXT1);
        let fitted = RangeFit::new(&set, Flags::DXT1).fit();
        assert_eq!(fitted.error, 0.0);

        let mut decoded = [0u8; 64];
        decompress_colour(&mut decoded, &fitted.to_block(), true);
        assert_eq!(decoded, rgba);
    }

    #[test]
    fn test_endpoints_are_extreme_points() {
        let mut rgba = [0u8; 64];
        for (i, pixel) in rgba.chunks_exact_mut(4).enumerate() {
            let v = (i * 16) as u8;
            pixel.copy_from_slice(&[v, v, v, 255]);
        }
        let set = ColourSet::new(&rgba, 0xffff, Flags::DXT1);
        let fitted = RangeFit::new(&set, Flags::DXT1).fit();

        let mut ends = [fitted.start, fitted.end];
        ends.sort_unstable();
        assert_eq!(ends, [0x0000, pack_565(glam::Vec3::splat(240.0))]);
        assert_eq!(fitted.indices[0] ^ fitted.indices[15], 1);
    }

    #[test]
    fn test_empty_set() {
        let set = ColourSet::new(&[0; 64], 0, Flags::DXT1);
        let fitted = RangeFit::new(&set, Flags::DXT1).fit();
        assert_eq!((fitted.start, fitted.end), (0, 0));
        assert_eq!(fitted.indices, [3; 16]);
        assert_eq!(fitted.error, 0.0);
    }
}
