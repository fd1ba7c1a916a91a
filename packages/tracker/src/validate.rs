use crate::error::ArtifactError;
use crate::models::{ArtifactDescriptor, ArtifactPayload};

/// Maximum accepted artifact key length.
const MAX_KEY_LEN: usize = 256;

/// Check artifact key shape before any storage work.
pub fn validate_key(key: &str) -> Result<(), ArtifactError> {
    if key.is_empty() {
        return Err(ArtifactError::InvalidDescriptor(
            "artifact key must not be empty".into(),
        ));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(ArtifactError::InvalidDescriptor(format!(
            "artifact key exceeds {MAX_KEY_LEN} characters"
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(ArtifactError::InvalidDescriptor(
            "artifact key must not contain control characters".into(),
        ));
    }
    // Keys are flat names; slashes belong to storage-key derivation.
    if key.contains('/') {
        return Err(ArtifactError::InvalidDescriptor(
            "artifact key must not contain '/'".into(),
        ));
    }
    Ok(())
}

/// Check a descriptor's payload content matches what its kind requires.
pub fn validate_descriptor(descriptor: &ArtifactDescriptor) -> Result<(), ArtifactError> {
    validate_key(&descriptor.key)?;

    let key = &descriptor.key;
    match &descriptor.payload {
        ArtifactPayload::Blob { path } => {
            if path.trim().is_empty() {
                return Err(ArtifactError::InvalidDescriptor(format!(
                    "blob artifact '{key}' requires a path or URI"
                )));
            }
        }
        ArtifactPayload::CodeVersion(request) => {
            if request.repository.trim().is_empty() || request.commit.trim().is_empty() {
                return Err(ArtifactError::InvalidDescriptor(format!(
                    "code version artifact '{key}' requires a repository and commit"
                )));
            }
        }
        ArtifactPayload::DatasetVersion(request) => {
            if request.dataset.trim().is_empty() {
                return Err(ArtifactError::InvalidDescriptor(format!(
                    "dataset version artifact '{key}' requires a dataset name"
                )));
            }
            if request.version.is_none() && request.content.is_none() {
                return Err(ArtifactError::InvalidDescriptor(format!(
                    "dataset version artifact '{key}' requires a version reference or content description"
                )));
            }
        }
    }

    Ok(())
}
