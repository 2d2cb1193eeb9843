/// Data structures mirroring the host's tab and tab-group objects
use serde::{Deserialize, Serialize};

/// Sentinel group id meaning "tab belongs to no group".
pub const TAB_GROUP_ID_NONE: i32 = -1;

/// Information about a browser tab. Host payloads carry many more fields;
/// unknown ones are ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    /// The host may omit the id (e.g. devtools windows), so it stays optional.
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub window_id: i32,
    #[serde(default = "group_id_none")]
    pub group_id: i32,
}

fn group_id_none() -> i32 {
    TAB_GROUP_ID_NONE
}

impl TabInfo {
    /// True if the tab currently sits in a group.
    pub fn is_grouped(&self) -> bool {
        self.group_id != TAB_GROUP_ID_NONE
    }
}

/// Information about a tab group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: i32,
    #[serde(default)]
    pub title: Option<String>,
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
    pub window_id: i32,
}

/// Host tab-group color enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

/// Payload of a tab-updated event; only the fields we act on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabChangeInfo {
    #[serde(default)]
    pub url: Option<String>,
}

/// Payload of a tab-moved event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabMoveInfo {
    pub window_id: i32,
    #[serde(default)]
    pub from_index: i32,
    #[serde(default)]
    pub to_index: i32,
}
