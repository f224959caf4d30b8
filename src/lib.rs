pub mod analyzer;
pub mod config;
pub mod render;
pub mod report;
pub mod risk;
pub mod transcode;

/// Audio file extensions we accept from the input directory.
/// Anything that isn't wav goes through the ffmpeg transcoder first.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "mp4", "flac"];

/// Suffix given to transcoder output files. Files carrying it are
/// skipped during enumeration so re-runs don't analyze them twice.
pub const CONVERTED_SUFFIX: &str = "_converted";

/// Application name for XDG paths
pub const APP_NAME: &str = "lfnscan";
