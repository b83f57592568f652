use glam::Vec3;

const POWER_ITERATIONS: usize = 8;

/// Symmetric 3×3 matrix stored as its upper triangle:
/// `[xx, xy, xz, yy, yz, zz]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sym3x3([f32; 6]);

impl Sym3x3 {
    #[inline]
    fn mul_vec(&self, v: Vec3) -> Vec3 {
        let m = &self.0;
        Vec3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[1] * v.x + m[3] * v.y + m[4] * v.z,
            m[2] * v.x + m[4] * v.y + m[5] * v.z,
        )
    }

    fn row(&self, index: usize) -> Vec3 {
        let m = &self.0;
        match index {
            0 => Vec3::new(m[0], m[1], m[2]),
            1 => Vec3::new(m[1], m[3], m[4]),
            _ => Vec3::new(m[2], m[4], m[5]),
        }
    }

    fn diagonal(&self) -> Vec3 {
        Vec3::new(self.0[0], self.0[3], self.0[5])
    }
}

/// Weighted centroid of the points.
///
/// Falls back to the plain mean when the weights sum to zero.
pub fn weighted_centroid(points: &[Vec3], weights: &[f32]) -> Vec3 {
    let total: f32 = weights.iter().sum();
    if total > f32::EPSILON {
        points
            .iter()
            .zip(weights)
            .fold(Vec3::ZERO, |acc, (&p, &w)| acc + p * w)
            / total
    } else if points.is_empty() {
        Vec3::ZERO
    } else {
        points.iter().copied().sum::<Vec3>() / points.len() as f32
    }
}

/// Weighted covariance of the points about their weighted centroid.
pub fn weighted_covariance(points: &[Vec3], weights: &[f32]) -> Sym3x3 {
    let centroid = weighted_centroid(points, weights);

    let mut covar = [0.0f32; 6];
    for (&p, &w) in points.iter().zip(weights) {
        let a = p - centroid;
        let b = a * w;

        covar[0] += a.x * b.x;
        covar[1] += a.x * b.y;
        covar[2] += a.x * b.z;
        covar[3] += a.y * b.y;
        covar[4] += a.y * b.z;
        covar[5] += a.z * b.z;
    }

    Sym3x3(covar)
}

/// Dominant eigenvector of the matrix by power iteration.
///
/// Iteration starts from the row with the largest diagonal entry rather than
/// a fixed vector, so opposing channels (red against green) still converge. The
/// vector is renormalised by its largest-magnitude component each round, so
/// the result is not unit length. A zero matrix yields `(1, 1, 1)`.
pub fn principal_component(matrix: &Sym3x3) -> Vec3 {
    let diagonal = matrix.diagonal();
    if diagonal.max_element() <= f32::EPSILON {
        return Vec3::ONE;
    }

    let start = if diagonal.x >= diagonal.y && diagonal.x >= diagonal.z {
        0
    } else if diagonal.y >= diagonal.z {
        1
    } else {
        2
    };
    let mut v = matrix.row(start);

    for _ in 0..POWER_ITERATIONS {
        let w = matrix.mul_vec(v);
        let a = w.abs().max_element();
        if a <= f32::EPSILON {
            break;
        }
        v = w / a;
    }

    v
}

/// Principal axis of a weighted point cloud.
pub fn principal_axis(points: &[Vec3], weights: &[f32]) -> Vec3 {
    principal_component(&weighted_covariance(points, weights))
}
