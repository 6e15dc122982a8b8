//! Run options resolved from command-line tokens.

use std::path::PathBuf;

use rigscale_math::DVec3;
use thiserror::Error;

/// Rename file read from the working directory.
pub const DEFAULT_RENAME_FILE: &str = "jointmap.cfg";

/// Destination used when only a source path is given.
pub const DEFAULT_DESTINATION: &str = "output.json";

/// Errors in the command line itself.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("No source scene given")]
    MissingSource,
}

/// Immutable configuration for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub rename_file: PathBuf,

    /// Uniform scale applied from the root down
    pub scale_factor: f64,

    pub remove_animations: bool,
    pub bake_root_scale: bool,
    pub remove_root_scale: bool,
    pub remove_root_rotation: bool,
    pub convert_axis: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            rename_file: PathBuf::from(DEFAULT_RENAME_FILE),
            scale_factor: 1.0,
            remove_animations: false,
            bake_root_scale: false,
            remove_root_scale: false,
            remove_root_rotation: false,
            convert_axis: false,
        }
    }
}

impl RunOptions {
    /// Resolve options from command-line tokens (program name excluded).
    ///
    /// Flags are recognized wherever they appear. Every other token is
    /// positional: the first is the source, later ones replace the
    /// destination.
    pub fn from_args<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut source = None;

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "-removeanim" => options.remove_animations = true,
                "-bakerootscale" => options.bake_root_scale = true,
                "-removerootscale" => options.remove_root_scale = true,
                "-removerootrotation" => options.remove_root_rotation = true,
                "-convertaxis" => options.convert_axis = true,
                "-scale10" => options.scale_factor = 10.0,
                "-scale100" => options.scale_factor = 100.0,
                _ if source.is_none() => source = Some(PathBuf::from(arg)),
                _ => options.destination = PathBuf::from(arg),
            }
        }

        options.source = source.ok_or(UsageError::MissingSource)?;
        Ok(options)
    }

    /// The uniform scale factor as a per-axis vector.
    pub fn scale(&self) -> DVec3 {
        DVec3::splat(self.scale_factor)
    }

    /// One-line usage text.
    pub fn usage(program: &str) -> String {
        format!(
            "Usage: {} [-scale10|-scale100] [-removeanim] [-bakerootscale] [-removerootscale] \
             [-removerootrotation] [-convertaxis] <source> [dest]",
            program
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::from_args(["in.json"]).unwrap();
        assert_eq!(options.source, PathBuf::from("in.json"));
        assert_eq!(options.destination, PathBuf::from(DEFAULT_DESTINATION));
        assert_eq!(options.rename_file, PathBuf::from(DEFAULT_RENAME_FILE));
        assert_eq!(options.scale_factor, 1.0);
        assert!(!options.remove_animations);
        assert!(!options.bake_root_scale);
        assert!(!options.remove_root_scale);
        assert!(!options.remove_root_rotation);
        assert!(!options.convert_axis);
    }

    #[test]
    fn test_all_flags() {
        let options = RunOptions::from_args([
            "-removeanim",
            "-bakerootscale",
            "-removerootscale",
            "-removerootrotation",
            "-convertaxis",
            "-scale100",
            "in.json",
            "out.json",
        ])
        .unwrap();
        assert!(options.remove_animations);
        assert!(options.bake_root_scale);
        assert!(options.remove_root_scale);
        assert!(options.remove_root_rotation);
        assert!(options.convert_axis);
        assert_eq!(options.scale_factor, 100.0);
        assert_eq!(options.scale(), DVec3::splat(100.0));
        assert_eq!(options.destination, PathBuf::from("out.json"));
    }

    #[test]
    fn test_flags_after_positionals() {
        let options = RunOptions::from_args(["in.json", "-scale10", "out.json", "-removeanim"]).unwrap();
        assert_eq!(options.source, PathBuf::from("in.json"));
        assert_eq!(options.destination, PathBuf::from("out.json"));
        assert_eq!(options.scale_factor, 10.0);
        assert!(options.remove_animations);
    }

    #[test]
    fn test_last_scale_flag_wins() {
        let options = RunOptions::from_args(["-scale100", "-scale10", "in.json"]).unwrap();
        assert_eq!(options.scale_factor, 10.0);
    }

    #[test]
    fn test_extra_positionals_replace_destination() {
        let options = RunOptions::from_args(["a.json", "b.json", "c.json"]).unwrap();
        assert_eq!(options.source, PathBuf::from("a.json"));
        assert_eq!(options.destination, PathBuf::from("c.json"));
    }

    #[test]
    fn test_missing_source() {
        let empty: [&str; 0] = [];
        assert_eq!(RunOptions::from_args(empty), Err(UsageError::MissingSource));
        assert_eq!(
            RunOptions::from_args(["-scale10", "-removeanim"]),
            Err(UsageError::MissingSource)
        );
    }
}
