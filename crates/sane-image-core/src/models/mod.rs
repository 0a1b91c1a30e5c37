pub mod file;
pub mod outcome;
pub mod queue;
pub mod transform;

pub use file::{media_subtype, Accountability, FileKey, FilePayload, RequestContext, UploadEvent};
pub use outcome::{ProcessOutcome, SkipReason};
pub use queue::QueueItem;
pub use transform::{
    AssetTransform, CanvasPad, EnlargementPolicy, FitMode, Gravity, OutputFormat, RenderStage,
    Rgba, TransformStep, TransformationPlan, WatermarkPlan,
};
