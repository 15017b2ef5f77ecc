use clap::Parser;
use std::path::PathBuf;

use crate::core::PlaybackRate;

// Build version with backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Video:  playa-ffmpeg 8.0 (static)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Side-by-side frame stepping comparison of two video decode paths
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Video file to load - optional, can also drag-and-drop
    #[arg(value_name = "FILE")]
    pub file_path: Option<PathBuf>,

    /// Start playing both panes once the file is loaded
    #[arg(short = 'a', long = "autoplay")]
    pub autoplay: bool,

    /// Initial playback rate for both panes (0.25, 0.5, 0.75, 1, 1.25, 1.5, 2)
    #[arg(short = 'r', long = "rate", value_name = "RATE", default_value = "1")]
    pub rate: PlaybackRate,

    /// Print the file's metadata and detected frame rate, then exit
    #[arg(long = "info", requires = "file_path")]
    pub info: bool,

    /// Enable debug logging to file (default: framestep.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom directory for the log file (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["framestep"]).unwrap();
        assert!(args.file_path.is_none());
        assert!(!args.autoplay);
        assert_eq!(args.rate, PlaybackRate::Normal);
        assert!(args.log_file.is_none());
        assert_eq!(args.verbosity, 0);
    }

    #[test]
    fn test_full_invocation() {
        let args = Args::try_parse_from([
            "framestep", "clip.mp4", "-a", "-r", "1.5x", "-vv", "--log", "-c", "/tmp/fs",
        ])
        .unwrap();
        assert_eq!(args.file_path, Some(PathBuf::from("clip.mp4")));
        assert!(args.autoplay);
        assert_eq!(args.rate, PlaybackRate::OneAndHalf);
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.log_file, Some(None));
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/fs")));
    }

    #[test]
    fn test_log_with_path() {
        let args = Args::try_parse_from(["framestep", "--log", "/tmp/out.log"]).unwrap();
        assert_eq!(args.log_file, Some(Some(PathBuf::from("/tmp/out.log"))));
    }

    #[test]
    fn test_rejects_unknown_rate() {
        assert!(Args::try_parse_from(["framestep", "-r", "3"]).is_err());
    }

    #[test]
    fn test_info_requires_file() {
        assert!(Args::try_parse_from(["framestep", "--info"]).is_err());
        assert!(Args::try_parse_from(["framestep", "--info", "clip.mp4"]).is_ok());
    }
}
