//! Scene axis systems and conversion between them.
//!
//! An axis system names the up vector, the front vector (by parity relative
//! to the up axis) and the handedness. Converting a scene re-orients the
//! direct children of the root node; geometry below them is untouched.

use rigscale_math::{DMat3, DMat3Ext, DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::anim::AnimCurve;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

/// Which of the two axes orthogonal to up is the front axis.
///
/// Even picks the first remaining axis in XYZ order, odd the second:
/// up X gives Y/Z, up Y gives X/Z, up Z gives X/Y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrontParity {
    Even,
    Odd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    RightHanded,
    LeftHanded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSystem {
    pub up: Axis,
    pub up_positive: bool,
    pub front: FrontParity,
    pub front_positive: bool,
    pub handedness: Handedness,
}

impl Default for AxisSystem {
    /// Y-up, right-handed, +Z front.
    fn default() -> Self {
        Self {
            up: Axis::Y,
            up_positive: true,
            front: FrontParity::Odd,
            front_positive: true,
            handedness: Handedness::RightHanded,
        }
    }
}

impl AxisSystem {
    /// Right-handed, Z-up, -Y front: the target of `-convertaxis`.
    ///
    /// X stays X, so converting from the default Y-up system is a quarter
    /// turn about X: (x, y, z) becomes (x, -z, y).
    pub const Z_UP_RIGHT_HANDED: AxisSystem = AxisSystem {
        up: Axis::Z,
        up_positive: true,
        front: FrontParity::Odd,
        front_positive: false,
        handedness: Handedness::RightHanded,
    };

    fn front_axis(&self) -> Axis {
        match (self.up, self.front) {
            (Axis::X, FrontParity::Even) => Axis::Y,
            (Axis::X, FrontParity::Odd) => Axis::Z,
            (Axis::Y, FrontParity::Even) => Axis::X,
            (Axis::Y, FrontParity::Odd) => Axis::Z,
            (Axis::Z, FrontParity::Even) => Axis::X,
            (Axis::Z, FrontParity::Odd) => Axis::Y,
        }
    }

    /// Columns are the right, up and front directions of this system.
    pub fn basis(&self) -> DMat3 {
        let sign = |positive: bool| -> f64 { if positive { 1.0 } else { -1.0 } };
        let up = self.up.unit() * sign(self.up_positive);
        let front = self.front_axis().unit() * sign(self.front_positive);
        let right = match self.handedness {
            Handedness::RightHanded => up.cross(front),
            Handedness::LeftHanded => front.cross(up),
        };
        DMat3::from_cols(right, up, front)
    }

    /// Change of basis taking coordinates in `self` to coordinates in `target`.
    pub fn conversion_to(&self, target: &AxisSystem) -> DMat3 {
        target.basis() * self.basis().transpose()
    }
}

/// Convert a scene to `target`. Returns false if it already uses it.
pub fn convert_scene(scene: &mut Scene, target: AxisSystem) -> bool {
    if scene.axis_system == target {
        log::info!("Axis system already matches target, no conversion needed");
        return false;
    }

    let m = scene.axis_system.conversion_to(&target);
    let mirrored = m.determinant() < 0.0;
    log::info!("Converting axis system {:?} -> {:?}", scene.axis_system, target);
    if mirrored {
        log::warn!("Axis conversion changes handedness; geometry is not mirrored");
    }

    for child in &mut scene.root.children {
        child.translation = m * child.translation;

        let (x, y, z) = (
            child.rotation.x.to_radians(),
            child.rotation.y.to_radians(),
            child.rotation.z.to_radians(),
        );
        let rotation = DMat3::from_euler(EulerRot::ZYX, z, y, x);
        let converted = if mirrored {
            m * rotation * m.transpose()
        } else {
            m * rotation
        };
        let (z, y, x) = DQuat::from_mat3(&converted).to_euler(EulerRot::ZYX);
        child.rotation = DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees());
    }

    // An axis-aligned change of basis maps every component onto exactly one
    // source component, so translation curves can be remapped channel by
    // channel.
    if let Some(perm) = m.axis_permutation() {
        let ids: Vec<_> = scene.root.children.iter().map(|c| c.id).collect();
        for layer in scene.animation_stacks.iter_mut().flat_map(|s| s.layers.iter_mut()) {
            for id in &ids {
                let Some(curves) = layer.node_mut(*id) else {
                    continue;
                };
                // Scale stays in the node's own frame, which rotates with it
                let translation = std::mem::take(&mut curves.translation);
                for (axis, (source, sign)) in perm.iter().enumerate() {
                    curves.translation[axis] = translation[*source].clone().map(|mut curve: AnimCurve| {
                        curve.scale_values_and_tangents(*sign);
                        curve
                    });
                }
                if curves.rotation.iter().any(Option::is_some) {
                    log::warn!("Rotation curves on node {} are not converted", id.0);
                }
            }
        }
    }

    scene.axis_system = target;
    true
}
