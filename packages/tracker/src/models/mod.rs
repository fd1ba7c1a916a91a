mod artifact;

pub use artifact::{ArtifactDescriptor, ArtifactPayload, ArtifactView};
