use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub uid: u64,
    pub display_name: String,
    pub email: Option<String>,
    pub country: Option<String>,
    pub referral_link: Option<String>,
    #[serde(default)]
    pub quota_info: QuotaInfo,
}

/// Storage usage in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaInfo {
    pub quota: u64,
    pub normal: u64,
    pub shared: u64,
}

/// File or folder metadata. `contents` is only filled for listed folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub bytes: u64,
    pub size: Option<String>,
    pub rev: Option<String>,
    pub hash: Option<String>,
    pub root: Option<String>,
    pub icon: Option<String>,
    pub mime_type: Option<String>,
    pub modified: Option<String>,
    pub client_mtime: Option<String>,
    #[serde(default)]
    pub thumb_exists: bool,
    #[serde(default)]
    pub contents: Vec<Metadata>,
}

/// A temporary direct link to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLink {
    pub url: String,
    pub expires: String,
}
