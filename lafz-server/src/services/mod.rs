//! Request-scoped services: workspace, external tools, alignment pipeline

pub mod aligner;
pub mod alignment_pipeline;
pub mod external_tool;
pub mod transcoder;
pub mod workspace;

pub use aligner::{Aligner, CtcForcedAligner};
pub use alignment_pipeline::{AlignmentPipeline, RequestStage};
pub use external_tool::run_tool;
pub use transcoder::{FfmpegTranscoder, Transcoder};
pub use workspace::RequestWorkspace;
