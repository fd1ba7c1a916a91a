#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind tag of an artifact attached to a tracked entity.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Raw payload bytes held in the artifact store.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "blob"))]
    Blob,
    /// Reference to a code snapshot registered with the code version service.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "code_version"))]
    CodeVersion,
    /// Reference to an immutable dataset version.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "dataset_version"))]
    DatasetVersion,
}

impl ArtifactKind {
    /// Returns true for kinds that link to a version registered elsewhere.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::CodeVersion | Self::DatasetVersion)
    }

    /// All possible kind values.
    pub const ALL: &'static [ArtifactKind] = &[Self::Blob, Self::CodeVersion, Self::DatasetVersion];

    /// Returns the string representation (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::CodeVersion => "code_version",
            Self::DatasetVersion => "dataset_version",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    invalid: String,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid artifact kind '{}'. Valid values: {}",
            self.invalid,
            ArtifactKind::ALL
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for ArtifactKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "code_version" => Ok(Self::CodeVersion),
            "dataset_version" => Ok(Self::DatasetVersion),
            _ => Err(ParseKindError {
                invalid: s.to_string(),
            }),
        }
    }
}
