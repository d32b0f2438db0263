use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// How reviews are located by the update/delete endpoints.
///
/// - `ById`: every review carries a generated `id`; addressing survives
///   deletions and reordering elsewhere in the list.
/// - `ByPosition`: reviews are `{username, message}` pairs addressed by their
///   current index; any earlier removal shifts the index of later entries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAddressing {
    #[default]
    ById,
    ByPosition,
}

impl std::str::FromStr for ReviewAddressing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by_id" | "id" => Ok(Self::ById),
            "by_position" | "position" | "index" => Ok(Self::ByPosition),
            other => Err(format!("unknown review addressing mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addressing_parses_aliases() {
        assert_eq!("by_id".parse::<ReviewAddressing>(), Ok(ReviewAddressing::ById));
        assert_eq!("Position".parse::<ReviewAddressing>(), Ok(ReviewAddressing::ByPosition));
        assert!("random".parse::<ReviewAddressing>().is_err());
    }

    #[test]
    fn addressing_serde_is_snake_case() {
        let json = serde_json::to_string(&ReviewAddressing::ByPosition).unwrap();
        assert_eq!(json, "\"by_position\"");
        let back: ReviewAddressing = serde_json::from_str("\"by_id\"").unwrap();
        assert_eq!(back, ReviewAddressing::ById);
    }
}
