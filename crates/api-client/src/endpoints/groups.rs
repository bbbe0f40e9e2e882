//! Community group endpoints

use super::item_path;
use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const GROUPS_PATH: &str = "/groups";

/// Groups API interface
#[derive(Clone)]
pub struct GroupsApi {
    client: ApiClient,
}

impl GroupsApi {
    /// Create a new groups API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List groups visible to the user
    ///
    /// GET /groups
    pub async fn list(&self) -> ApiResult<Vec<Group>> {
        self.client.get(GROUPS_PATH, &[]).await
    }

    /// Get a single group
    ///
    /// GET /groups/{id}
    pub async fn get(&self, id: &str) -> ApiResult<Group> {
        self.client.get(&item_path(GROUPS_PATH, id)?, &[]).await
    }

    /// Create a group owned by the user
    ///
    /// POST /groups
    pub async fn create(&self, group: &GroupInput) -> ApiResult<Group> {
        self.client.post(GROUPS_PATH, group).await
    }

    /// Join a group
    ///
    /// POST /groups/{id}/join
    pub async fn join(&self, id: &str) -> ApiResult<Group> {
        let path = format!("{}/join", item_path(GROUPS_PATH, id)?);
        self.client.post(&path, &json!({})).await
    }

    /// Leave a group
    ///
    /// POST /groups/{id}/leave
    pub async fn leave(&self, id: &str) -> ApiResult<()> {
        let path = format!("{}/leave", item_path(GROUPS_PATH, id)?);
        let _: Value = self.client.post(&path, &json!({})).await?;
        Ok(())
    }

    /// Delete a group the user owns
    ///
    /// DELETE /groups/{id}
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&item_path(GROUPS_PATH, id)?).await
    }
}

/// A community group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group ID
    #[serde(alias = "_id")]
    pub id: String,
    /// Group name
    pub name: String,
    /// What the group is about
    #[serde(default)]
    pub description: Option<String>,
    /// Member IDs
    #[serde(default)]
    pub members: Vec<String>,
    /// Only visible to members
    #[serde(default)]
    pub is_private: bool,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    /// Whether `user_id` is a member
    #[must_use]
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Body for creating a group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    /// Group name
    pub name: String,
    /// What the group is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only visible to members
    pub is_private: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_membership() {
        let group: Group = serde_json::from_value(json!({
            "_id": "g1",
            "name": "Morning walkers",
            "members": ["u1", "u2"]
        }))
        .unwrap();

        assert!(group.has_member("u2"));
        assert!(!group.has_member("u3"));
        assert!(!group.is_private);
    }
}
