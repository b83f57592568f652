use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::Deserialize;

use crate::dxt::Format;

/// Compression flag bitmask.
///
/// The mask carries four independent groups: the block format, the colour
/// fitting strategy, the colour error metric and the alpha weighting toggle.
/// Any combination is accepted; [`Flags::fix`] collapses each group to exactly
/// one value before the codec looks at it.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Flags(u32);

impl Flags {
    /// DXT1 compression (8 bytes per block, no alpha).
    pub const DXT1: Self = Self(1 << 0);
    /// DXT3 compression (16 bytes per block, explicit 4-bit alpha).
    pub const DXT3: Self = Self(1 << 1);
    /// DXT5 compression (16 bytes per block, interpolated alpha).
    pub const DXT5: Self = Self(1 << 2);
    /// Slow, high quality colour compressor.
    pub const COLOUR_CLUSTER_FIT: Self = Self(1 << 3);
    /// Fast, low quality colour compressor.
    pub const COLOUR_RANGE_FIT: Self = Self(1 << 4);
    /// Perceptual channel weights when measuring colour error.
    pub const COLOUR_METRIC_PERCEPTUAL: Self = Self(1 << 5);
    /// Equal channel weights when measuring colour error.
    pub const COLOUR_METRIC_UNIFORM: Self = Self(1 << 6);
    /// Weight each pixel's colour by its alpha during fitting.
    pub const WEIGHT_COLOUR_BY_ALPHA: Self = Self(1 << 7);
    /// Very slow, very high quality colour compressor.
    pub const COLOUR_ITERATIVE_CLUSTER_FIT: Self = Self(1 << 8);

    const FORMAT_MASK: u32 = Self::DXT1.0 | Self::DXT3.0 | Self::DXT5.0;
    const FIT_MASK: u32 = Self::COLOUR_ITERATIVE_CLUSTER_FIT.0
        | Self::COLOUR_CLUSTER_FIT.0
        | Self::COLOUR_RANGE_FIT.0;
    const METRIC_MASK: u32 = Self::COLOUR_METRIC_PERCEPTUAL.0 | Self::COLOUR_METRIC_UNIFORM.0;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wraps raw bits without validating them.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Normalises the mask so that every group holds exactly one value.
    ///
    /// DXT3 and DXT5 are kept only when they are the sole format bit, anything
    /// else becomes DXT1. The range fit is kept only when it is the sole fit
    /// bit, anything else (including the iterative cluster fit) becomes the
    /// plain cluster fit. The uniform metric is kept only when it is the sole
    /// metric bit, anything else becomes perceptual. The alpha weighting bit is
    /// passed through and every other bit is dropped.
    pub const fn fix(self) -> Self {
        let mut method = self.0 & Self::FORMAT_MASK;
        let mut fit = self.0 & Self::FIT_MASK;
        let mut metric = self.0 & Self::METRIC_MASK;
        let extra = self.0 & Self::WEIGHT_COLOUR_BY_ALPHA.0;

        if method != Self::DXT3.0 && method != Self::DXT5.0 {
            method = Self::DXT1.0;
        }
        if fit != Self::COLOUR_RANGE_FIT.0 {
            fit = Self::COLOUR_CLUSTER_FIT.0;
        }
        if metric != Self::COLOUR_METRIC_UNIFORM.0 {
            metric = Self::COLOUR_METRIC_PERCEPTUAL.0;
        }

        Self(method | fit | metric | extra)
    }

    /// The block format selected by the normalised mask.
    pub const fn format(self) -> Format {
        let fixed = self.fix();
        if fixed.contains(Self::DXT3) {
            Format::Dxt3
        } else if fixed.contains(Self::DXT5) {
            Format::Dxt5
        } else {
            Format::Dxt1
        }
    }

    /// The colour fit selected by the normalised mask.
    ///
    /// Never [`ColourFitKind::IterativeCluster`]: normalisation folds that bit
    /// into the plain cluster fit.
    pub const fn fit(self) -> ColourFitKind {
        if self.fix().contains(Self::COLOUR_RANGE_FIT) {
            ColourFitKind::Range
        } else {
            ColourFitKind::Cluster
        }
    }

    pub const fn metric(self) -> MetricKind {
        if self.fix().contains(Self::COLOUR_METRIC_UNIFORM) {
            MetricKind::Uniform
        } else {
            MetricKind::Perceptual
        }
    }

    pub const fn weight_colour_by_alpha(self) -> bool {
        self.contains(Self::WEIGHT_COLOUR_BY_ALPHA)
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flags({:#05x})", self.0)
    }
}

/// Colour fitting strategy requested by a flag mask.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourFitKind {
    Range,
    Cluster,
    #[serde(alias = "iterative", alias = "iterative-cluster")]
    IterativeCluster,
}

impl FromStr for ColourFitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "range" => Ok(Self::Range),
            "cluster" => Ok(Self::Cluster),
            "iterative" | "iterative-cluster" | "iterativecluster" => Ok(Self::IterativeCluster),
            _ => Err(format!("unknown colour fit '{s}' (expected range, cluster or iterative)")),
        }
    }
}

/// Channel weighting used to measure colour error.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Perceptual,
    Uniform,
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "perceptual" => Ok(Self::Perceptual),
            "uniform" => Ok(Self::Uniform),
            _ => Err(format!("unknown colour metric '{s}' (expected perceptual or uniform)")),
        }
    }
}

/// Typed view of a compression configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CompressionSettings {
    pub format: Format,
    pub fit: ColourFitKind,
    pub metric: MetricKind,
    pub weight_colour_by_alpha: bool,
}

impl CompressionSettings {
    /// Opaque fast settings.
    pub const fn opaque_fast() -> Self {
        Self {
            format: Format::Dxt1,
            fit: ColourFitKind::Range,
            metric: MetricKind::Perceptual,
            weight_colour_by_alpha: false,
        }
    }

    /// Opaque basic settings.
    pub const fn opaque_basic() -> Self {
        Self {
            format: Format::Dxt1,
            fit: ColourFitKind::Cluster,
            metric: MetricKind::Perceptual,
            weight_colour_by_alpha: false,
        }
    }

    /// Alpha basic settings, sharp alpha edges.
    pub const fn alpha_sharp() -> Self {
        Self {
            format: Format::Dxt3,
            fit: ColourFitKind::Cluster,
            metric: MetricKind::Perceptual,
            weight_colour_by_alpha: true,
        }
    }

    /// Alpha basic settings, smooth alpha gradients.
    pub const fn alpha_smooth() -> Self {
        Self {
            format: Format::Dxt5,
            fit: ColourFitKind::Cluster,
            metric: MetricKind::Perceptual,
            weight_colour_by_alpha: true,
        }
    }

    pub const fn flags(self) -> Flags {
        let format = match self.format {
            Format::Dxt1 => Flags::DXT1,
            Format::Dxt3 => Flags::DXT3,
            Format::Dxt5 => Flags::DXT5,
        };
        let fit = match self.fit {
            ColourFitKind::Range => Flags::COLOUR_RANGE_FIT,
            ColourFitKind::Cluster => Flags::COLOUR_CLUSTER_FIT,
            ColourFitKind::IterativeCluster => Flags::COLOUR_ITERATIVE_CLUSTER_FIT,
        };
        let metric = match self.metric {
            MetricKind::Perceptual => Flags::COLOUR_METRIC_PERCEPTUAL,
            MetricKind::Uniform => Flags::COLOUR_METRIC_UNIFORM,
        };
        let extra = if self.weight_colour_by_alpha {
            Flags::WEIGHT_COLOUR_BY_ALPHA.0
        } else {
            0
        };

        Flags(format.0 | fit.0 | metric.0 | extra)
    }
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self::opaque_basic()
    }
}

impl From<CompressionSettings> for Flags {
    fn from(settings: CompressionSettings) -> Self {
        settings.flags()
    }
}
