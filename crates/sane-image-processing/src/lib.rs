//! Sane Image Processing Library
//!
//! Decides what the asset renderer should do with an upload: the AVIF re-encode plan
//! and the proportionally sized watermark pass.

pub mod planner;
pub mod traits;
pub mod watermark;

pub use planner::{is_eligible, TransformationPlanner};
pub use traits::{AssetDimensions, AssetRenderer, RenderError, RenderOutcome, RenderResult};
pub use watermark::WatermarkCompositor;
