use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a stored file. The optimizer reuses it when re-storing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileKey(String);

impl FileKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for FileKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<Uuid> for FileKey {
    fn from(key: Uuid) -> Self {
        Self(key.to_string())
    }
}

/// Mutable file record carried by an upload notification.
///
/// Only the fields the optimizer reads or rewrites are typed; everything else the
/// host sends is kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePayload {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub filesize: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_download: Option<String>,
    /// Idempotency marker. Only a literal JSON `true` counts as set.
    #[serde(default, deserialize_with = "deserialize_marker")]
    pub optimized: bool,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

fn deserialize_marker<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(matches!(value, Some(JsonValue::Bool(true))))
}

impl FilePayload {
    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// Subtype of the declared media type: `image/jpeg` -> `jpeg`.
    pub fn media_subtype(&self) -> Option<&str> {
        self.media_type.as_deref().and_then(media_subtype)
    }
}

/// Second `/`-separated segment of `media_type`, verbatim.
///
/// No case folding and no parameter stripping: `image/png/x` -> `png`,
/// `image/PNG` -> `PNG`.
pub fn media_subtype(media_type: &str) -> Option<&str> {
    media_type.split('/').nth(1).filter(|s| !s.is_empty())
}

/// Permissions of the caller that triggered the upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accountability {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub admin: bool,
}

/// Ambient execution context the host attaches to every upload notification.
/// It is carried through the queue and handed back to the file store unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Name of the host's database/storage connection.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub accountability: Option<Accountability>,
}

/// "File uploaded" notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "key")]
    pub file_key: FileKey,
    pub payload: FilePayload,
    #[serde(default)]
    pub context: RequestContext,
}

impl UploadEvent {
    pub fn new(file_key: impl Into<FileKey>, payload: FilePayload, context: RequestContext) -> Self {
        Self {
            file_key: file_key.into(),
            payload,
            context,
        }
    }
}
