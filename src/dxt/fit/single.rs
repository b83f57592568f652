use crate::dxt::colour_block::palette;
use crate::dxt::fit::single_lut::{CANDIDATE_INDICES, LOOKUP_5_3, LOOKUP_6_3, SingleColourLookup};
use crate::dxt::fit::{ColourFit, FittedColours, fit_endpoints};
use crate::dxt::{ColourSet, Flags, Metric};

/// Table-driven fit for a block holding exactly one distinct colour.
pub struct SingleColourFit<'a> {
    colours: &'a ColourSet,
    metric: Metric,
}

impl<'a> SingleColourFit<'a> {
    pub fn new(colours: &'a ColourSet, flags: Flags) -> Self {
        Self {
            colours,
            metric: Metric::from_flags(flags),
        }
    }
}

impl ColourFit for SingleColourFit<'_> {
    fn fit(&self) -> FittedColours {
        let Some(&[r, g, b]) = self.colours.colours().first() else {
            return fit_endpoints(self.colours, self.metric, 0, 0);
        };

        let lookups: [&SingleColourLookup; 3] = [
            &LOOKUP_5_3[r as usize],
            &LOOKUP_6_3[g as usize],
            &LOOKUP_5_3[b as usize],
        ];

        let mut best = 0;
        let mut best_error = u32::MAX;
        for candidate in 0..CANDIDATE_INDICES.len() {
            let error = lookups
                .iter()
                .map(|lookup| (lookup.sources[candidate].error as u32).pow(2))
                .sum::<u32>();
            if error < best_error {
                best_error = error;
                best = candidate;
            }
        }

        let [sr, sg, sb] = lookups.map(|lookup| lookup.sources[best].start as u16);
        let [er, eg, eb] = lookups.map(|lookup| lookup.sources[best].end as u16);
        let start = (sr << 11) | (sg << 5) | sb;
        let end = (er << 11) | (eg << 5) | eb;

        let index = CANDIDATE_INDICES[best];
        let [dr, dg, db, _] = palette(start, end, false)[index as usize];
        let decoded = glam::Vec3::new(dr as f32, dg as f32, db as f32);
        let error = self.colours.weights()[0] * self.metric.distance(decoded, self.colours.points()[0]);

        FittedColours {
            start,
            end,
            indices: self.colours.remap_indices(&[index]),
            error,
        }
    }
}
