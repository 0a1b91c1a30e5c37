//! Sane Image Hook
//!
//! Reacts to "file uploaded" notifications by re-encoding eligible images to AVIF,
//! fitting them within a bounding box, stamping a proportional watermark and writing
//! the result back under the same file key. Uploads are processed one at a time.

pub mod hook;
pub mod metadata;
pub mod pipeline;
pub mod setup;
pub mod throttle;

pub use hook::ImageOptimizerHook;
pub use metadata::{replace_extension, rewrite_payload};
pub use pipeline::OptimizationPipeline;
pub use setup::ImageOptimizer;
pub use throttle::ThrottledRenderer;
