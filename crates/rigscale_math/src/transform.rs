// Transform utilities for DMat4 and DMat3
//
// Extends glam's double-precision matrices with the per-axis operations the
// rescaler needs. Scene data is stored in f64 so repeated passes over the
// same asset do not drift.

use glam::{DMat3, DMat4, DVec3, DVec4};

/// Extension trait for DMat4 affine transforms.
pub trait DMat4Ext {
    /// The translation part of an affine transform (the `w_axis` xyz).
    fn translation(&self) -> DVec3;

    /// Scale only the translation part of an affine transform per axis.
    /// The upper 3x3 block (rotation, scale, shear) is left untouched.
    fn scale_translation(&self, scale: DVec3) -> DMat4;
}

impl DMat4Ext for DMat4 {
    fn translation(&self) -> DVec3 {
        self.w_axis.truncate()
    }

    fn scale_translation(&self, scale: DVec3) -> DMat4 {
        let t = self.translation() * scale;
        DMat4::from_cols(
            self.x_axis,
            self.y_axis,
            self.z_axis,
            DVec4::new(t.x, t.y, t.z, self.w_axis.w),
        )
    }
}

/// Extension trait for DMat3 change-of-basis matrices.
pub trait DMat3Ext {
    /// Decompose a signed permutation matrix.
    ///
    /// Entry `i` of the result is `(j, sign)` such that component `i` of
    /// `self * v` equals `sign * v[j]`. Returns `None` if the matrix is not
    /// a signed permutation (every row and column holding exactly one `±1`).
    fn axis_permutation(&self) -> Option<[(usize, f64); 3]>;
}

impl DMat3Ext for DMat3 {
    fn axis_permutation(&self) -> Option<[(usize, f64); 3]> {
        const EPSILON: f64 = 1e-9;

        let mut result = [(0, 0.0); 3];
        let mut used = [false; 3];

        for (row, slot) in result.iter_mut().enumerate() {
            let mut found = None;
            for col in 0..3 {
                let value = self.col(col)[row];
                if value.abs() < EPSILON {
                    continue;
                }
                if (value.abs() - 1.0).abs() > EPSILON || found.is_some() {
                    return None;
                }
                found = Some((col, value.signum()));
            }

            let (col, sign) = found?;
            if used[col] {
                return None;
            }
            used[col] = true;
            *slot = (col, sign);
        }

        Some(result)
    }
}
