use serde::Deserialize;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CreateGroupRequest {
    pub title: String,
    pub description: String,
    pub profile_picture: Option<String>,
}
