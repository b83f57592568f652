use glam::Vec3;

use crate::dxt::flags::{Flags, MetricKind};

/// Per-channel weights applied to squared colour error.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Metric(Vec3);

impl Metric {
    /// Equal weights for red, green and blue.
    pub const UNIFORM: Self = Self(Vec3::ONE);

    /// Luma weights (Rec. 709): green counts most, blue least.
    pub const PERCEPTUAL: Self = Self(Vec3::new(0.2126, 0.7152, 0.0722));

    pub const fn from_kind(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Perceptual => Self::PERCEPTUAL,
            MetricKind::Uniform => Self::UNIFORM,
        }
    }

    pub const fn from_flags(flags: Flags) -> Self {
        Self::from_kind(flags.metric())
    }

    pub const fn weights(self) -> Vec3 {
        self.0
    }

    /// Weighted squared distance between two colours.
    #[inline]
    pub fn distance(self, a: Vec3, b: Vec3) -> f32 {
        let d = a - b;
        self.0.dot(d * d)
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::PERCEPTUAL
    }
}
