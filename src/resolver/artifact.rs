//! Source artifact verification
//!
//! Downloading and extracting artifacts happens elsewhere; resolution only
//! needs to know that an artifact can be fetched.

use url::Url;

use crate::error::{Result, origin};
use crate::model::RemoteArtifact;

/// Decides whether a remote artifact is available
pub trait ArtifactChecker: Send + Sync {
    fn check(&self, artifact: &RemoteArtifact) -> Result<()>;
}

/// Accepts well-formed `http(s)`/`ftp` URLs with a host, and `file` URLs that
/// point at an existing file.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlArtifactChecker;

impl ArtifactChecker for UrlArtifactChecker {
    fn check(&self, artifact: &RemoteArtifact) -> Result<()> {
        let raw = artifact.url.trim();
        let unavailable = |reason: String| origin::artifact_unavailable(raw, reason);

        let url = Url::parse(raw).map_err(|e| unavailable(e.to_string()))?;
        match url.scheme() {
            "http" | "https" | "ftp" => {
                if url.host_str().is_none_or(str::is_empty) {
                    return Err(unavailable("URL has no host".to_string()));
                }
                Ok(())
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| unavailable("not a local file path".to_string()))?;
                if path.is_file() {
                    Ok(())
                } else {
                    Err(unavailable(format!("{} does not exist", path.display())))
                }
            }
            other => Err(unavailable(format!("unsupported scheme '{other}'"))),
        }
    }
}
