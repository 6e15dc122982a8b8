//! Rigscale Core - Scene rescaling and bone renaming for rigged assets.
//!
//! This crate provides:
//!
//! - **Scene model**: `Scene`, `SceneNode`, skeleton/mesh attributes, skins
//! - **Animation model**: stacks, layers and per-channel keyframe curves
//! - **Processing**: scale propagation, animation rebasing, bone renaming,
//!   axis conversion
//! - **Scene I/O**: JSON scene files
//!
//! # Example
//!
//! ```ignore
//! use rigscale_core::{pipeline, RenameTable, RunOptions};
//!
//! let options = RunOptions::from_args(["-scale100", "character.json", "out.json"])?;
//! let table = RenameTable::from_file(&options.rename_file)?;
//! let summary = pipeline::run(&options, &table)?;
//! println!("Renamed {} nodes", summary.traversal.renamed);
//! ```

pub mod anim;
pub mod axis;
pub mod config;
pub mod format;
pub mod pipeline;
pub mod rebase;
pub mod rename;
pub mod scaler;
pub mod scene;
pub mod traverse;

// Re-export commonly used types
pub use anim::{AnimCurve, AnimationLayer, AnimationStack, Channel, Keyframe};
pub use axis::AxisSystem;
pub use config::{RunOptions, UsageError};
pub use format::{load_scene, save_scene, LoadError, SaveError};
pub use pipeline::{PipelineError, RunSummary};
pub use rename::{NameDeduper, RenameTable};
pub use scene::{NodeAttribute, NodeId, Scene, SceneNode, Skeleton, SkeletonKind};
