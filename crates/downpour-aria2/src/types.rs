//! Wire DTOs for the aria2 JSON-RPC and notification surfaces.

use serde::Deserialize;

/// Subset of `aria2.tellStatus` the adapter cares about. All numeric values
/// arrive as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Aria2Status {
    #[serde(default)]
    pub(crate) total_length: Option<String>,
    #[serde(default)]
    pub(crate) completed_length: Option<String>,
    #[serde(default)]
    pub(crate) download_speed: Option<String>,
    #[serde(default)]
    pub(crate) followed_by: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) bittorrent: Option<BittorrentMeta>,
    #[serde(default)]
    pub(crate) files: Vec<Aria2File>,
}

impl Aria2Status {
    /// The real transfer GID when this status describes a metadata handle.
    pub(crate) fn followed_by_gid(&self) -> Option<&str> {
        self.followed_by
            .as_deref()
            .and_then(<[String]>::first)
            .map(String::as_str)
            .filter(|gid| !gid.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BittorrentMeta {
    #[serde(default)]
    pub(crate) info: Option<BittorrentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BittorrentInfo {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Aria2File {
    #[serde(default)]
    pub(crate) path: String,
    #[serde(default)]
    pub(crate) length: Option<String>,
    #[serde(default)]
    pub(crate) completed_length: Option<String>,
}

/// One message from the engine's notification socket.
#[derive(Debug, Deserialize)]
pub(crate) struct Notification {
    pub(crate) method: String,
    #[serde(default)]
    pub(crate) params: Vec<NotificationParam>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationParam {
    #[serde(default)]
    pub(crate) gid: String,
}

/// Parse an aria2 decimal-string counter; parse failures yield 0.
pub(crate) fn parse_decimal(value: Option<&str>) -> u64 {
    value.and_then(|raw| raw.trim().parse().ok()).unwrap_or(0)
}
