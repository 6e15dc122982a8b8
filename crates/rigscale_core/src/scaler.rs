//! Per-axis scaling rules for each kind of scene data.
//!
//! Every function takes the same three-component scale. A scale of exactly
//! `(0, 0, 0)` is a "disabled" marker for translations, never a real scale.

use rigscale_math::{DMat4, DMat4Ext, DVec3};

use crate::scene::Cluster;

/// Scale a translation per axis. `(0, 0, 0)` leaves it unchanged.
pub fn scale_translation(translation: DVec3, scale: DVec3) -> DVec3 {
    if scale == DVec3::ZERO {
        return translation;
    }
    translation * scale
}

/// Scale the translation part of an affine transform, keeping rotation and shear.
pub fn scale_affine(matrix: DMat4, scale: DVec3) -> DMat4 {
    matrix.scale_translation(scale)
}

/// Scale a skeleton length or size field.
///
/// Bone extent lies along the bone's local axis, so only the X component
/// of the scale applies.
pub fn scale_skeleton_length(value: f64, scale: DVec3) -> f64 {
    value * scale.x
}

/// Scale every vertex position per axis.
pub fn scale_mesh_vertices(vertices: &mut [DVec3], scale: DVec3) {
    for vertex in vertices {
        *vertex *= scale;
    }
}

/// Scale the translation of all three bind matrices of every cluster.
pub fn scale_skin_bind_matrices(clusters: &mut [Cluster], scale: DVec3) {
    for cluster in clusters {
        cluster.transform = scale_affine(cluster.transform, scale);
        cluster.transform_link = scale_affine(cluster.transform_link, scale);
        cluster.transform_associate_model = scale_affine(cluster.transform_associate_model, scale);
    }
}
