use std::path::Path;

use serde::Serialize;

/// Returned after a config was written.
#[derive(Debug, Serialize)]
pub struct SubmitConfigResponse {
    /// Always `"success"`.
    pub status: &'static str,
    /// Absolute path of the stored file.
    pub path: String,
}

impl SubmitConfigResponse {
    pub fn success(path: &Path) -> Self {
        Self {
            status: "success",
            path: path.to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
