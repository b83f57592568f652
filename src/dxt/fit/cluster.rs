use glam::Vec3;

use crate::dxt::colour_block::{pack_565, unpack_565};
use crate::dxt::fit::{ColourFit, FittedColours, RangeFit, fit_endpoints};
use crate::dxt::maths::principal_axis;
use crate::dxt::{ColourSet, Flags, Metric};

/// Upper bound on axis refinement rounds.
pub const MAX_ITERATIONS: usize = 8;

/// Exhaustive fit over every ordered split of the points into four runs.
///
/// Points are sorted by their projection onto the principal axis. Each run
/// maps to one palette entry (endpoint 0, the 2/3 and 1/3 interpolants,
/// endpoint 1, in that order along the axis), and for every split the least
/// squares endpoints and their error follow in closed form from prefix sums.
/// The range fit is evaluated first, so the result is never worse than it.
pub struct ClusterFit<'a> {
    colours: &'a ColourSet,
    metric: Metric,
    iterations: usize,
}

/// Least squares endpoints of the best split and their closed-form error.
#[derive(Copy, Clone, Debug)]
struct Candidate {
    start: Vec3,
    end: Vec3,
    error: f32,
}

impl<'a> ClusterFit<'a> {
    pub fn new(colours: &'a ColourSet, flags: Flags) -> Self {
        Self {
            colours,
            metric: Metric::from_flags(flags),
            iterations: 1,
        }
    }

    /// Re-derives the axis from the best endpoints for up to `iterations`
    /// rounds, stopping early once the error no longer improves.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.clamp(1, MAX_ITERATIONS);
        self
    }

    fn best_split(&self, axis: Vec3) -> Option<Candidate> {
        let points = self.colours.points();
        let weights = self.colours.weights();
        let n = points.len();

        let mut order: [usize; 16] = std::array::from_fn(|i| i);
        order[..n].sort_by(|&a, &b| points[a].dot(axis).total_cmp(&points[b].dot(axis)));

        let mut w = [0.0f32; 17];
        let mut x = [Vec3::ZERO; 17];
        for (i, &point) in order[..n].iter().enumerate() {
            w[i + 1] = w[i] + weights[point];
            x[i + 1] = x[i] + points[point] * weights[point];
        }

        let weights = self.metric.weights();
        let grid_max = Vec3::splat(255.0);
        let mut best: Option<Candidate> = None;

        for i in 0..=n {
            for j in i..=n {
                for k in j..=n {
                    let (w0, w1, w2, w3) = (w[i], w[j] - w[i], w[k] - w[j], w[n] - w[k]);
                    let (x0, x1, x2, x3) = (x[i], x[j] - x[i], x[k] - x[j], x[n] - x[k]);

                    let alpha2 = w0 + w1 * (4.0 / 9.0) + w2 * (1.0 / 9.0);
                    let beta2 = w1 * (1.0 / 9.0) + w2 * (4.0 / 9.0) + w3;
                    let alphabeta = (w1 + w2) * (2.0 / 9.0);
                    let alphax = x0 + x1 * (2.0 / 3.0) + x2 * (1.0 / 3.0);
                    let betax = x1 * (1.0 / 3.0) + x2 * (2.0 / 3.0) + x3;

                    let det = alpha2 * beta2 - alphabeta * alphabeta;
                    if det.abs() <= f32::EPSILON {
                        continue;
                    }

                    let start = (alphax * beta2 - betax * alphabeta) / det;
                    let end = (betax * alpha2 - alphax * alphabeta) / det;
                    let start = snap(start.clamp(Vec3::ZERO, grid_max));
                    let end = snap(end.clamp(Vec3::ZERO, grid_max));

                    let e = start * start * alpha2 + end * end * beta2
                        + (start * end * alphabeta - start * alphax - end * betax) * 2.0;
                    let error = weights.dot(e);

                    if best.is_none_or(|b| error < b.error) {
                        best = Some(Candidate { start, end, error });
                    }
                }
            }
        }

        best
    }
}

/// Rounds a colour to the value its 565 encoding decodes to.
fn snap(colour: Vec3) -> Vec3 {
    let [r, g, b] = unpack_565(pack_565(colour));
    Vec3::new(r as f32, g as f32, b as f32)
}

impl ColourFit for ClusterFit<'_> {
    fn fit(&self) -> FittedColours {
        let mut best = RangeFit::with_metric(self.colours, self.metric).fit();
        if self.colours.count() == 0 {
            return best;
        }

        let mut axis = principal_axis(self.colours.points(), self.colours.weights());
        let mut best_closed = f32::INFINITY;

        for _ in 0..self.iterations {
            let Some(candidate) = self.best_split(axis) else {
                break;
            };

            let fitted = fit_endpoints(
                self.colours,
                self.metric,
                pack_565(candidate.start),
                pack_565(candidate.end),
            );
            if fitted.error < best.error {
                best = fitted;
            }

            if candidate.error >= best_closed {
                break;
            }
            best_closed = candidate.error;

            axis = candidate.end - candidate.start;
            if axis.length_squared() <= f32::EPSILON {
                break;
            }
        }

        best
    }
}
