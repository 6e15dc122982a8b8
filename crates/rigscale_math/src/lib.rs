// Re-export glam for convenience
pub use glam::*;

// rigscale math helpers
mod transform;
pub use transform::{DMat3Ext, DMat4Ext};
