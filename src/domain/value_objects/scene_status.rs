//! Scene generation status

use serde::{Deserialize, Serialize};

/// Where a scene is in its prose-generation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    /// Outline only, never generated
    #[default]
    Draft,
    /// A generation run has been requested and not yet finished
    Generating,
    /// The last generation run wrote prose
    Complete,
    /// The last generation run failed
    Error,
}

impl SceneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Generating => "generating",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SceneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "generating" => Ok(Self::Generating),
            "complete" => Ok(Self::Complete),
            "error" => Ok(Self::Error),
            other => Err(format!("Unknown scene status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            SceneStatus::Draft,
            SceneStatus::Generating,
            SceneStatus::Complete,
            SceneStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<SceneStatus>().unwrap(), status);
        }
        assert!("pending".parse::<SceneStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&SceneStatus::Generating).unwrap();
        assert_eq!(json, "\"generating\"");
    }
}
