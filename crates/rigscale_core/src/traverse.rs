//! Depth-first scale propagation over the node tree.
//!
//! Each branch carries its own current scale and whether it is inside a
//! skeleton. The scale can grow at skeleton roots (and at empties when baking
//! root scale) and is inherited by everything below.

use rigscale_math::DVec3;

use crate::config::RunOptions;
use crate::rename::{NameDeduper, RenameTable};
use crate::scaler::{scale_mesh_vertices, scale_skeleton_length, scale_skin_bind_matrices, scale_translation};
use crate::scene::{NodeAttribute, Scene, SceneNode, SkeletonKind};

/// State handed from a node to each of its children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchState {
    pub scale: DVec3,
    pub in_skeleton: bool,
}

impl BranchState {
    pub fn root(scale: DVec3) -> Self {
        Self {
            scale,
            in_skeleton: false,
        }
    }
}

/// Counters reported after a traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub nodes: usize,
    pub skeletons: usize,
    pub meshes: usize,
    pub renamed: usize,
}

/// One geometric pass over a scene.
#[derive(Debug)]
pub struct SceneTraversal<'a> {
    options: &'a RunOptions,
    names: NameDeduper<'a>,
    stats: TraversalStats,
}

impl<'a> SceneTraversal<'a> {
    pub fn new(options: &'a RunOptions, table: &'a RenameTable) -> Self {
        Self {
            options,
            names: NameDeduper::new(table),
            stats: TraversalStats::default(),
        }
    }

    /// Process the tree under `root` in pre-order, starting from `state`.
    ///
    /// Uses an explicit stack, so deep rigs do not grow the call stack.
    pub fn run(&mut self, root: &mut SceneNode, state: BranchState) {
        let mut stack = vec![(root, state)];
        while let Some((node, state)) = stack.pop() {
            let child_state = self.visit(node, state);
            // Reversed so children pop in their original order
            for child in node.children.iter_mut().rev() {
                stack.push((child, child_state));
            }
        }
    }

    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    /// Process a single node and return the state for its children.
    fn visit(&mut self, node: &mut SceneNode, state: BranchState) -> BranchState {
        let options = self.options;
        let mut scale = state.scale;
        let in_skeleton;

        self.stats.nodes += 1;
        log::info!("  {} ({})", node.name, node.attribute.label());

        match &mut node.attribute {
            NodeAttribute::Skeleton(skeleton) => {
                self.stats.skeletons += 1;
                node.translation = scaled_translation(node.translation, scale);

                let field = if skeleton.kind == SkeletonKind::Limb { "Length" } else { "Size" };
                if let Some(extent) = skeleton.extent_mut() {
                    let old = *extent;
                    *extent = scale_skeleton_length(old, scale);
                    log::info!("    Scale {}: {:.3} -> {:.3}", field, old, *extent);
                }

                if !state.in_skeleton {
                    if options.remove_root_rotation {
                        log::info!(
                            "    Remove Root Rotation: {:.3}, {:.3}, {:.3}",
                            node.rotation.x,
                            node.rotation.y,
                            node.rotation.z
                        );
                        node.rotation = DVec3::ZERO;
                    }
                    if options.bake_root_scale {
                        scale = folded_scale(scale, node.scale);
                    }
                    if options.bake_root_scale || options.remove_root_scale {
                        node.scale = DVec3::ONE;
                    }
                }
                in_skeleton = true;
            }
            NodeAttribute::Mesh(mesh) => {
                self.stats.meshes += 1;
                node.translation = scaled_translation(node.translation, scale);

                log::info!("    Scale Mesh: {:.6}, {:.6}, {:.6}", scale.x, scale.y, scale.z);
                scale_mesh_vertices(&mut mesh.vertices, scale);
                for skin in mesh.skins_mut() {
                    scale_skin_bind_matrices(&mut skin.clusters, scale);
                }
                in_skeleton = false;
            }
            NodeAttribute::Empty | NodeAttribute::Other { .. } => {
                node.translation = scaled_translation(node.translation, scale);
                if options.bake_root_scale {
                    scale = folded_scale(scale, node.scale);
                    node.scale = DVec3::ONE;
                }
                in_skeleton = false;
            }
        }

        if self.names.rename_in_place(&mut node.name) {
            log::info!("    Rename Node: {}", node.name);
            self.stats.renamed += 1;
        }

        BranchState { scale, in_skeleton }
    }
}

fn scaled_translation(translation: DVec3, scale: DVec3) -> DVec3 {
    let scaled = scale_translation(translation, scale);
    log::info!(
        "    Scale Translation: {:.6}, {:.6}, {:.6} -> {:.6}, {:.6}, {:.6}",
        translation.x,
        translation.y,
        translation.z,
        scaled.x,
        scaled.y,
        scaled.z
    );
    scaled
}

fn folded_scale(scale: DVec3, local: DVec3) -> DVec3 {
    let folded = scale * local;
    log::info!(
        "    Scale Root: {:.6}, {:.6}, {:.6} -> {:.6}, {:.6}, {:.6}",
        local.x,
        local.y,
        local.z,
        folded.x,
        folded.y,
        folded.z
    );
    folded
}

/// Run the geometric pass over a whole scene, starting from the run's
/// uniform scale outside any skeleton.
pub fn process_scene(scene: &mut Scene, options: &RunOptions, table: &RenameTable) -> TraversalStats {
    log::info!("Processing Scene");
    let mut traversal = SceneTraversal::new(options, table);
    traversal.run(&mut scene.root, BranchState::root(options.scale()));
    traversal.stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Cluster, Deformer, Mesh, NodeId, Skeleton, Skin};
    use rigscale_math::{DMat4, DMat4Ext};

    fn skeleton(id: u32, name: &str, kind: SkeletonKind) -> SceneNode {
        SceneNode::new(NodeId(id), name).with_attribute(NodeAttribute::Skeleton(Skeleton::new(kind)))
    }

    fn limb(id: u32, name: &str, length: f64) -> SceneNode {
        let mut joint = Skeleton::new(SkeletonKind::Limb);
        joint.limb_length = length;
        SceneNode::new(NodeId(id), name)
            .with_attribute(NodeAttribute::Skeleton(joint))
            .with_translation(DVec3::new(0.0, length, 0.0))
    }

    fn options(scale_factor: f64) -> RunOptions {
        RunOptions {
            scale_factor,
            ..Default::default()
        }
    }

    fn extent(node: &SceneNode) -> Option<f64> {
        match &node.attribute {
            NodeAttribute::Skeleton(s) => s.extent(),
            _ => None,
        }
    }

    #[test]
    fn test_skeleton_chain_scaled() {
        let root = skeleton(1, "Hips", SkeletonKind::Root)
            .with_translation(DVec3::new(0.0, 90.0, 0.0))
            .with_child(limb(2, "Spine", 5.0));
        let mut scene = Scene::with_root("rig", SceneNode::new(NodeId(0), "RootNode").with_child(root));

        let stats = process_scene(&mut scene, &options(10.0), &RenameTable::new());
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.skeletons, 2);
        assert_eq!(stats.renamed, 0);

        let hips = &scene.root.children[0];
        assert_eq!(hips.translation, DVec3::new(0.0, 900.0, 0.0));
        assert_eq!(extent(hips), Some(1000.0));
        assert_eq!(hips.scale, DVec3::ONE);

        let spine = &hips.children[0];
        assert_eq!(extent(spine), Some(50.0));
        assert_eq!(spine.translation, DVec3::new(0.0, 50.0, 0.0));
        assert_eq!(spine.name, "Spine");
    }

    #[test]
    fn test_bake_root_scale_propagates() {
        let root = skeleton(1, "Hips", SkeletonKind::Root)
            .with_scale(DVec3::new(2.0, 3.0, 4.0))
            .with_translation(DVec3::ONE)
            .with_child(limb(2, "Spine", 5.0).with_translation(DVec3::ONE));
        let mut scene = Scene::with_root("rig", SceneNode::new(NodeId(0), "RootNode").with_child(root));

        let opts = RunOptions {
            bake_root_scale: true,
            ..options(1.0)
        };
        process_scene(&mut scene, &opts, &RenameTable::new());

        let hips = &scene.root.children[0];
        assert_eq!(hips.scale, DVec3::ONE);
        // The root's own translation lives in parent space
        assert_eq!(hips.translation, DVec3::ONE);

        let spine = &hips.children[0];
        assert_eq!(spine.translation, DVec3::new(2.0, 3.0, 4.0));
        // Length only follows the X component
        assert_eq!(extent(spine), Some(10.0));
    }

    #[test]
    fn test_inner_joint_scale_not_folded() {
        let inner = limb(2, "Spine", 1.0).with_scale(DVec3::splat(5.0));
        let root = skeleton(1, "Hips", SkeletonKind::Root).with_child(inner.with_child(limb(3, "Chest", 1.0)));
        let mut scene = Scene::with_root("rig", SceneNode::new(NodeId(0), "RootNode").with_child(root));

        let opts = RunOptions {
            bake_root_scale: true,
            ..options(1.0)
        };
        process_scene(&mut scene, &opts, &RenameTable::new());

        let spine = &scene.root.children[0].children[0];
        assert_eq!(spine.scale, DVec3::splat(5.0));
        assert_eq!(extent(&spine.children[0]), Some(1.0));
    }

    #[test]
    fn test_remove_root_scale_does_not_fold() {
        let root = skeleton(1, "Hips", SkeletonKind::Root)
            .with_scale(DVec3::splat(2.0))
            .with_child(limb(2, "Spine", 5.0));
        let mut scene = Scene::with_root("rig", SceneNode::new(NodeId(0), "RootNode").with_child(root));

        let opts = RunOptions {
            remove_root_scale: true,
            ..options(1.0)
        };
        process_scene(&mut scene, &opts, &RenameTable::new());

        let hips = &scene.root.children[0];
        assert_eq!(hips.scale, DVec3::ONE);
        assert_eq!(extent(&hips.children[0]), Some(5.0));
    }

    #[test]
    fn test_remove_root_rotation_only_at_skeleton_root() {
        let mut spine = limb(2, "Spine", 1.0);
        spine.rotation = DVec3::new(0.0, 0.0, 45.0);
        let mut root = skeleton(1, "Hips", SkeletonKind::Root).with_child(spine);
        root.rotation = DVec3::new(90.0, 0.0, 0.0);
        let mut scene = Scene::with_root("rig", SceneNode::new(NodeId(0), "RootNode").with_child(root));

        let opts = RunOptions {
            remove_root_rotation: true,
            ..options(1.0)
        };
        process_scene(&mut scene, &opts, &RenameTable::new());

        let hips = &scene.root.children[0];
        assert_eq!(hips.rotation, DVec3::ZERO);
        assert_eq!(hips.children[0].rotation, DVec3::new(0.0, 0.0, 45.0));
    }

    #[test]
    fn test_mesh_breaks_skeleton_chain() {
        // A skeleton under a mesh is a new skeleton root
        let nested = skeleton(3, "Prop", SkeletonKind::Root).with_scale(DVec3::splat(2.0));
        let mesh = SceneNode::new(NodeId(2), "Body")
            .with_attribute(NodeAttribute::Mesh(Mesh::new(vec![DVec3::ONE])))
            .with_child(nested);
        let root = skeleton(1, "Hips", SkeletonKind::Root).with_child(mesh);
        let mut scene = Scene::with_root("rig", SceneNode::new(NodeId(0), "RootNode").with_child(root));

        let opts = RunOptions {
            remove_root_scale: true,
            ..options(1.0)
        };
        process_scene(&mut scene, &opts, &RenameTable::new());

        let prop = &scene.root.children[0].children[0].children[0];
        assert_eq!(prop.scale, DVec3::ONE);
    }

    #[test]
    fn test_mesh_vertices_and_bind_matrices_scaled() {
        let bind = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let mut mesh = Mesh::new(vec![DVec3::new(1.0, 1.0, 1.0), DVec3::new(0.0, 2.0, 0.0)]);
        mesh.deformers.push(Deformer::Skin(Skin {
            name: "Skin".to_string(),
            clusters: vec![Cluster {
                link: NodeId(1),
                transform: bind,
                transform_link: bind,
                transform_associate_model: DMat4::IDENTITY,
                indices: vec![0, 1],
                weights: vec![1.0, 1.0],
            }],
        }));
        mesh.deformers.push(Deformer::BlendShape { name: "Smile".to_string() });

        let body = SceneNode::new(NodeId(2), "Body")
            .with_attribute(NodeAttribute::Mesh(mesh))
            .with_translation(DVec3::ONE);
        let root = SceneNode::new(NodeId(0), "RootNode")
            .with_child(skeleton(1, "Hips", SkeletonKind::Root))
            .with_child(body);
        let mut scene = Scene::with_root("skin", root);

        process_scene(&mut scene, &options(100.0), &RenameTable::new());

        let body = &scene.root.children[1];
        assert_eq!(body.translation, DVec3::splat(100.0));
        let NodeAttribute::Mesh(mesh) = &body.attribute else {
            panic!("Expected mesh");
        };
        assert_eq!(mesh.vertices[0], DVec3::splat(100.0));
        assert_eq!(mesh.vertices[1], DVec3::new(0.0, 200.0, 0.0));

        let cluster = &mesh.skins().next().unwrap().clusters[0];
        assert_eq!(cluster.transform.translation(), DVec3::new(100.0, 200.0, 300.0));
        assert_eq!(cluster.transform_link.translation(), DVec3::new(100.0, 200.0, 300.0));
        assert_eq!(cluster.transform_associate_model, DMat4::IDENTITY);
        assert_eq!(mesh.deformers[1], Deformer::BlendShape { name: "Smile".to_string() });
    }

    #[test]
    fn test_empty_bake_scale_propagates() {
        let group = SceneNode::new(NodeId(1), "Group")
            .with_scale(DVec3::splat(0.5))
            .with_child(SceneNode::new(NodeId(2), "Locator").with_translation(DVec3::splat(4.0)));
        let mut scene = Scene::with_root("empty", SceneNode::new(NodeId(0), "RootNode").with_child(group));

        let opts = RunOptions {
            bake_root_scale: true,
            ..options(10.0)
        };
        process_scene(&mut scene, &opts, &RenameTable::new());

        let group = &scene.root.children[0];
        assert_eq!(group.scale, DVec3::ONE);
        assert_eq!(group.children[0].translation, DVec3::splat(20.0));
    }

    #[test]
    fn test_duplicate_names_made_unique() {
        let root = SceneNode::new(NodeId(0), "RootNode")
            .with_child(skeleton(1, "Bone_L", SkeletonKind::Root).with_child(limb(2, "Bone_L", 1.0)))
            .with_child(skeleton(3, "Bone_L", SkeletonKind::Root))
            .with_child(SceneNode::new(NodeId(4), "Bone_L"));
        let mut scene = Scene::with_root("dupes", root);

        let table: RenameTable = [("Bone_L", "LeftArm")].into_iter().collect();
        let stats = process_scene(&mut scene, &options(1.0), &table);
        assert_eq!(stats.renamed, 4);

        let mut names = Vec::new();
        scene.root.walk(&mut |n| names.push(n.name.clone()));
        assert_eq!(names, vec!["RootNode", "LeftArm", "Bone_L02", "Bone_L03", "Bone_L04"]);
    }

    #[test]
    fn test_swap_table_on_siblings() {
        let root = SceneNode::new(NodeId(0), "RootNode")
            .with_child(skeleton(1, "A", SkeletonKind::Root))
            .with_child(skeleton(2, "B", SkeletonKind::Root));
        let mut scene = Scene::with_root("swap", root);

        let table: RenameTable = [("A", "B"), ("B", "A")].into_iter().collect();
        let stats = process_scene(&mut scene, &options(1.0), &table);
        assert_eq!(stats.renamed, 2);

        let names: Vec<_> = scene.root.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_mesh_visited_first_keeps_shared_name() {
        let root = SceneNode::new(NodeId(0), "RootNode")
            .with_child(
                SceneNode::new(NodeId(1), "Arm").with_attribute(NodeAttribute::Mesh(Mesh::new(vec![DVec3::ONE]))),
            )
            .with_child(skeleton(2, "Arm", SkeletonKind::Root));
        let mut scene = Scene::with_root("shared", root);

        process_scene(&mut scene, &options(1.0), &RenameTable::new());

        assert_eq!(scene.root.children[0].name, "Arm");
        assert_eq!(scene.root.children[1].name, "Arm02");
    }

    #[test]
    fn test_children_visited_in_order() {
        let root = SceneNode::new(NodeId(0), "RootNode")
            .with_child(SceneNode::new(NodeId(1), "A").with_child(SceneNode::new(NodeId(2), "X")))
            .with_child(SceneNode::new(NodeId(3), "B").with_child(SceneNode::new(NodeId(4), "X")));
        let mut scene = Scene::with_root("order", root);

        process_scene(&mut scene, &options(1.0), &RenameTable::new());

        assert_eq!(scene.root.children[0].children[0].name, "X");
        assert_eq!(scene.root.children[1].children[0].name, "X02");
    }
}
