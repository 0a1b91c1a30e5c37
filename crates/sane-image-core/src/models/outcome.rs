use serde::{Deserialize, Serialize};

use super::file::FileKey;

/// Why a file was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Media type outside the eligible set (or missing).
    UnsupportedMediaType { media_type: Option<String> },
    /// The AVIF render was not strictly smaller than the original.
    NotSmaller { original_size: u64, rendered_size: u64 },
}

/// Result of one processing attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessOutcome {
    Optimized {
        file_key: FileKey,
        original_size: u64,
        final_size: u64,
        width: u32,
        height: u32,
    },
    Skipped(SkipReason),
}

impl ProcessOutcome {
    pub fn is_optimized(&self) -> bool {
        matches!(self, ProcessOutcome::Optimized { .. })
    }
}
