//! Fixed values of the optimizer. Runtime-tunable ones have env overrides in `config`.

/// Subtypes eligible for re-encoding.
pub const SUPPORTED_SUBTYPES: [&str; 4] = ["jpeg", "jpg", "png", "webp"];

pub const DEFAULT_MAX_DIMENSION: u32 = 1920;
pub const DEFAULT_QUALITY: u8 = 75;
pub const DEFAULT_WATERMARK_PERCENT: f64 = 20.0;
pub const DEFAULT_MIN_WATERMARK_WIDTH: u32 = 100;
pub const DEFAULT_WATERMARK_PATH: &str =
    "/directus/extensions/directus-extension-sane-image-size/watermark.png";
pub const DEFAULT_ITEM_TIMEOUT_SECS: u64 = 300;

pub const ENV_MAX_DIMENSION: &str = "EXTENSIONS_SANE_IMAGE_SIZE_MAXSIZE";
pub const ENV_QUALITY: &str = "EXTENSIONS_SANE_IMAGE_SIZE_QUALITY";
pub const ENV_WATERMARK_PATH: &str = "EXTENSIONS_SANE_IMAGE_SIZE_WATERMARK_PATH";
pub const ENV_SUPPRESS_EVENTS: &str = "EXTENSIONS_SANE_IMAGE_SIZE_SUPPRESS_EVENTS";
pub const ENV_NORMALIZE_CANVAS: &str = "EXTENSIONS_SANE_IMAGE_SIZE_NORMALIZE_CANVAS";
pub const ENV_RENDER_RATE: &str = "EXTENSIONS_SANE_IMAGE_SIZE_RENDER_RATE";
pub const ENV_RENDER_BURST: &str = "EXTENSIONS_SANE_IMAGE_SIZE_RENDER_BURST";
pub const ENV_ITEM_TIMEOUT_SECS: &str = "EXTENSIONS_SANE_IMAGE_SIZE_ITEM_TIMEOUT_SECS";
