//! One complete run: load, convert, rebase or strip animation, rescale and
//! rename, save.

use thiserror::Error;

use crate::axis::{convert_scene, AxisSystem};
use crate::config::RunOptions;
use crate::format::{load_scene, save_scene, LoadError, SaveError};
use crate::rebase::{rebase_animation, remove_animations, RebaseStats};
use crate::rename::RenameTable;
use crate::scene::{Scene, SystemUnit};
use crate::traverse::{process_scene, TraversalStats};

/// A fatal run error.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load scene: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to save scene: {0}")]
    Save(#[from] SaveError),
}

impl PipelineError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Load(_) => 2,
            PipelineError::Save(_) => 3,
        }
    }
}

/// What a run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub traversal: TraversalStats,
    pub animation: RebaseStats,
    pub stacks_removed: usize,
    pub axis_converted: bool,
}

impl RunSummary {
    fn log(&self) {
        log::info!(
            "Processed {} nodes ({} skeleton, {} mesh), renamed {}",
            self.traversal.nodes,
            self.traversal.skeletons,
            self.traversal.meshes,
            self.traversal.renamed
        );
        log::info!(
            "Animation: {} layers, {} curves rescaled, {} curves cleared, {} stacks removed",
            self.animation.layers,
            self.animation.curves_rescaled,
            self.animation.curves_cleared,
            self.stacks_removed
        );
    }
}

/// Apply every requested transformation to an already loaded scene.
pub fn process(scene: &mut Scene, options: &RunOptions, table: &RenameTable) -> RunSummary {
    let mut summary = RunSummary::default();

    if options.convert_axis {
        summary.axis_converted = convert_scene(scene, AxisSystem::Z_UP_RIGHT_HANDED);
    }

    // Animation goes first; both passes read the nodes' local scale
    if options.remove_animations {
        summary.stacks_removed = remove_animations(scene);
    } else {
        summary.animation = rebase_animation(scene, options.scale());
    }

    summary.traversal = process_scene(scene, options, table);
    scene.system_unit = SystemUnit::Centimeter;

    summary
}

/// Load `options.source`, process it and save it to `options.destination`.
///
/// Nothing is written when loading fails.
pub fn run(options: &RunOptions, table: &RenameTable) -> Result<RunSummary, PipelineError> {
    let mut scene = load_scene(&options.source)?;
    let summary = process(&mut scene, options, table);
    summary.log();
    save_scene(&scene, &options.destination)?;
    Ok(summary)
}
