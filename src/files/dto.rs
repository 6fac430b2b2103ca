use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredFile {
    #[serde(rename = "fileName")]
    pub file_name: String,
}
