//! Animation curve rebasing.
//!
//! Scale keyed on a node is folded into the factor applied to its
//! descendants' translation curves, and the consumed scale curve is cleared
//! so the scale is not applied twice.

use rigscale_math::DVec3;

use crate::anim::AnimationLayer;
use crate::scene::{Scene, SceneNode};

/// Counters reported after rebasing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebaseStats {
    pub layers: usize,
    pub curves_rescaled: usize,
    pub curves_cleared: usize,
}

/// Remove every animation stack from the scene. Returns how many were removed.
pub fn remove_animations(scene: &mut Scene) -> usize {
    log::info!("Removing Animation Stacks:");
    // Last to first
    let mut removed = 0;
    while let Some(stack) = scene.animation_stacks.pop() {
        log::info!("  {}", stack.name);
        removed += 1;
    }
    removed
}

/// Rebase every layer of every stack, in stack then layer order.
///
/// `initial` is the per-axis factor at the root; `(1, 1, 1)` rebases scale
/// curves only, the run's uniform factor also rescales the whole animation.
pub fn rebase_animation(scene: &mut Scene, initial: DVec3) -> RebaseStats {
    log::info!("Process Animations");
    let mut stats = RebaseStats::default();

    let Scene {
        root,
        animation_stacks,
        ..
    } = scene;

    for stack in animation_stacks.iter_mut() {
        log::info!("  Stack {}", stack.name);
        for layer in &mut stack.layers {
            log::info!("  Layer {}", layer.name);
            rebase_layer(root, layer, initial, &mut stats);
            stats.layers += 1;
        }
    }

    stats
}

/// Rebase one layer against the node tree rooted at `root`.
pub fn rebase_layer(root: &SceneNode, layer: &mut AnimationLayer, initial: DVec3, stats: &mut RebaseStats) {
    let mut stack = vec![(root, initial)];

    while let Some((node, mut scale)) = stack.pop() {
        if let Some(curves) = layer.node_mut(node.id) {
            for axis in 0..3 {
                // Parent scale applies to this node's own translation first
                if let Some(translation) = &mut curves.translation[axis] {
                    translation.scale_values_and_tangents(scale[axis]);
                    stats.curves_rescaled += 1;
                }

                if let Some(local_scale) = &mut curves.scale[axis] {
                    if let Some(value) = local_scale.value() {
                        scale[axis] *= value;
                    }
                    local_scale.clear();
                    stats.curves_cleared += 1;
                }
            }
            log::debug!("      {} new scale {:.6}, {:.6}, {:.6}", node.name, scale.x, scale.y, scale.z);
        }

        for child in node.children.iter().rev() {
            stack.push((child, scale));
        }
    }
}
