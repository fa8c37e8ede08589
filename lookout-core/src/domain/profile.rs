//! Profile domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker value the actor puts in `error` when the account does not exist
const NOT_FOUND_MARKER: &str = "not_found";

/// Public profile summary served to callers
///
/// Every field is optional: an upstream field that is missing or has an
/// unexpected type is reported as `null`, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
    pub post_count: Option<u64>,
    pub bio: Option<String>,
}

impl Profile {
    /// Projects one actor dataset item onto a profile
    pub fn from_item(item: &Value) -> Self {
        Self {
            username: string_field(item, "username"),
            display_name: string_field(item, "fullName"),
            avatar_url: string_field(item, "profilePicUrl"),
            followers_count: count_field(item, "followersCount"),
            following_count: count_field(item, "followsCount"),
            post_count: count_field(item, "postsCount"),
            bio: string_field(item, "biography"),
        }
    }
}

/// Whether a dataset item is the actor's "entity not found" record
pub fn is_not_found_item(item: &Value) -> bool {
    item.get("error").and_then(Value::as_str) == Some(NOT_FOUND_MARKER)
}

fn string_field(item: &Value, field: &str) -> Option<String> {
    item.get(field).and_then(Value::as_str).map(str::to_string)
}

fn count_field(item: &Value, field: &str) -> Option<u64> {
    item.get(field).and_then(Value::as_u64)
}
