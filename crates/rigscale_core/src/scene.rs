//! Scene graph types for rigscale.
//!
//! The scene is a single node tree with one attribute per node, plus the
//! animation stacks that drive node channels. Everything is double precision
//! and serializable so scenes can round-trip through the on-disk format.

use std::collections::HashSet;

use rigscale_math::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::anim::AnimationStack;
use crate::axis::AxisSystem;

/// Stable identity of a node. Names change during processing, ids never do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Sub-kind of a skeleton joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkeletonKind {
    Root,
    Limb,
    LimbNode,
    Effector,
}

impl SkeletonKind {
    /// Human readable label used in progress output.
    pub fn label(&self) -> &'static str {
        match self {
            SkeletonKind::Root => "Skeleton",
            SkeletonKind::Limb => "Limb",
            SkeletonKind::LimbNode => "Limb Node",
            SkeletonKind::Effector => "Effector",
        }
    }
}

/// A skeleton joint attribute.
///
/// Which scalar describes the joint's extent depends on the kind: roots and
/// limb nodes use `size`, limbs use `limb_length`, effectors have none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub kind: SkeletonKind,

    #[serde(default = "default_skeleton_size")]
    pub size: f64,

    #[serde(default = "default_limb_length")]
    pub limb_length: f64,
}

fn default_skeleton_size() -> f64 {
    100.0
}

fn default_limb_length() -> f64 {
    1.0
}

impl Skeleton {
    /// Create a joint of the given kind with default extents.
    pub fn new(kind: SkeletonKind) -> Self {
        Self {
            kind,
            size: default_skeleton_size(),
            limb_length: default_limb_length(),
        }
    }

    /// The field that describes this joint's extent, if any.
    pub fn extent(&self) -> Option<f64> {
        match self.kind {
            SkeletonKind::Root | SkeletonKind::LimbNode => Some(self.size),
            SkeletonKind::Limb => Some(self.limb_length),
            SkeletonKind::Effector => None,
        }
    }

    /// Mutable access to the extent field, if any.
    pub fn extent_mut(&mut self) -> Option<&mut f64> {
        match self.kind {
            SkeletonKind::Root | SkeletonKind::LimbNode => Some(&mut self.size),
            SkeletonKind::Limb => Some(&mut self.limb_length),
            SkeletonKind::Effector => None,
        }
    }
}

/// Binding of mesh vertices to one bone, with its bind pose matrices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// The bone node this cluster is linked to.
    pub link: NodeId,

    /// Mesh transform at bind time.
    pub transform: DMat4,

    /// Bone transform at bind time.
    pub transform_link: DMat4,

    /// Associate model transform at bind time.
    #[serde(default = "identity")]
    pub transform_associate_model: DMat4,

    #[serde(default)]
    pub indices: Vec<u32>,

    #[serde(default)]
    pub weights: Vec<f64>,
}

fn identity() -> DMat4 {
    DMat4::IDENTITY
}

/// A skin deformer: one cluster per influencing bone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    #[serde(default)]
    pub name: String,

    pub clusters: Vec<Cluster>,
}

/// Mesh deformers. Only skins carry data the rescaler touches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Deformer {
    Skin(Skin),
    BlendShape { name: String },
    VertexCache { name: String },
    Unknown { name: String },
}

/// Mesh geometry attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Control point positions in node-local space.
    pub vertices: Vec<DVec3>,

    /// Polygon vertex indices, passed through untouched.
    #[serde(default)]
    pub polygons: Vec<Vec<u32>>,

    #[serde(default)]
    pub deformers: Vec<Deformer>,
}

impl Mesh {
    pub fn new(vertices: Vec<DVec3>) -> Self {
        Self {
            vertices,
            ..Default::default()
        }
    }

    /// Iterate the skin deformers of this mesh.
    pub fn skins(&self) -> impl Iterator<Item = &Skin> {
        self.deformers.iter().filter_map(|d| match d {
            Deformer::Skin(skin) => Some(skin),
            _ => None,
        })
    }

    /// Iterate the skin deformers of this mesh mutably.
    pub fn skins_mut(&mut self) -> impl Iterator<Item = &mut Skin> {
        self.deformers.iter_mut().filter_map(|d| match d {
            Deformer::Skin(skin) => Some(skin),
            _ => None,
        })
    }
}

/// The attribute attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeAttribute {
    /// No attribute (null / group node)
    #[default]
    Empty,

    /// A skeleton joint
    Skeleton(Skeleton),

    /// Mesh geometry
    Mesh(Mesh),

    /// Any attribute kind the rescaler does not handle (camera, light, ...)
    Other { kind: String },
}

impl NodeAttribute {
    /// Label used in progress output.
    pub fn label(&self) -> &str {
        match self {
            NodeAttribute::Empty => "Empty",
            NodeAttribute::Skeleton(skeleton) => skeleton.kind.label(),
            NodeAttribute::Mesh(_) => "Mesh",
            NodeAttribute::Other { kind } => kind,
        }
    }
}

/// A node in the scene tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,

    pub name: String,

    #[serde(default)]
    pub translation: DVec3,

    /// Euler rotation in degrees, XYZ order
    #[serde(default)]
    pub rotation: DVec3,

    #[serde(default = "unit_scale")]
    pub scale: DVec3,

    #[serde(default)]
    pub attribute: NodeAttribute,

    #[serde(default)]
    pub children: Vec<SceneNode>,
}

fn unit_scale() -> DVec3 {
    DVec3::ONE
}

impl SceneNode {
    /// Create a node with an identity transform and no attribute.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            translation: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
            attribute: NodeAttribute::Empty,
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: NodeAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_translation(mut self, translation: DVec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            f(node);
            stack.extend(node.children.iter().rev());
        }
    }

    /// Find a node in this subtree by id.
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// Find a node in this subtree by its current name.
    pub fn find_by_name(&self, name: &str) -> Option<&SceneNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.name == name {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

/// Length unit the scene's distances are expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemUnit {
    Millimeter,
    #[default]
    Centimeter,
    Decimeter,
    Meter,
    Kilometer,
    Inch,
    Foot,
}

/// A complete scene: node tree, animation and global settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name (usually from filename)
    #[serde(default)]
    pub name: String,

    pub root: SceneNode,

    #[serde(default)]
    pub animation_stacks: Vec<AnimationStack>,

    #[serde(default)]
    pub axis_system: AxisSystem,

    #[serde(default)]
    pub system_unit: SystemUnit,
}

impl Scene {
    /// Create a scene with an empty root node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: SceneNode::new(NodeId(0), "RootNode"),
            animation_stacks: Vec::new(),
            axis_system: AxisSystem::default(),
            system_unit: SystemUnit::default(),
        }
    }

    /// Build a scene around an existing root node.
    pub fn with_root(name: impl Into<String>, root: SceneNode) -> Self {
        Self {
            root,
            ..Self::new(name)
        }
    }

    /// Find a node by id.
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.root.find(id)
    }

    /// Find a node by its current name.
    pub fn node_by_name(&self, name: &str) -> Option<&SceneNode> {
        self.root.find_by_name(name)
    }

    /// Total number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Check structural invariants the processing passes rely on.
    ///
    /// Node ids must be unique and every skin cluster must link a node of
    /// this scene. Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let mut ids = HashSet::new();
        let mut duplicate = None;
        self.root.walk(&mut |node| {
            if !ids.insert(node.id) && duplicate.is_none() {
                duplicate = Some(node.id);
            }
        });
        if let Some(id) = duplicate {
            return Err(format!("duplicate node id {}", id.0));
        }

        let mut dangling = None;
        self.root.walk(&mut |node| {
            if let NodeAttribute::Mesh(mesh) = &node.attribute {
                for cluster in mesh.skins().flat_map(|s| &s.clusters) {
                    if !ids.contains(&cluster.link) && dangling.is_none() {
                        dangling = Some((node.name.clone(), cluster.link));
                    }
                }
            }
        });
        if let Some((mesh, link)) = dangling {
            return Err(format!("mesh '{}' has a cluster linked to missing node {}", mesh, link.0));
        }

        Ok(())
    }
}
