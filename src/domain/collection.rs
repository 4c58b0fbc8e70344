//! Collection kinds
//!
//! Every source collection is mapped onto one of a closed set of kinds. The kind
//! selects the extraction rule, the flattening prune list and the default
//! destination table name.

use crate::domain::SluiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extraction rule family for a source collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Take the sequence at the extraction key as-is (`sports`, `sports_competition`, ...)
    #[default]
    Generic,
    /// Unwrap `sport_event` from each schedule entry (`competition_schedules`)
    Schedules,
    /// Markets stamped with their event id (`sport_event_markets`)
    Markets,
    /// Outcomes stamped with event, market and book ids (`outcomes`)
    Outcomes,
    /// Player props stamped with their event id (`sport_event_player_props`)
    PlayerProps,
}

impl CollectionKind {
    /// Resolve the kind for a collection name; unknown names use the generic rule
    pub fn from_collection_name(name: &str) -> Self {
        match name {
            "competition_schedules" => Self::Schedules,
            "sport_event_markets" => Self::Markets,
            "outcomes" => Self::Outcomes,
            "sport_event_player_props" => Self::PlayerProps,
            _ => Self::Generic,
        }
    }

    /// Default destination table for this kind and extraction key
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::domain::CollectionKind;
    ///
    /// assert_eq!(CollectionKind::Markets.table_name("markets"), "sport_event_markets");
    /// assert_eq!(CollectionKind::Outcomes.table_name("markets"), "sport_event_markets_outcomes");
    /// assert_eq!(CollectionKind::Generic.table_name("competitions"), "competitions");
    /// ```
    pub fn table_name(self, extraction_key: &str) -> String {
        match self {
            Self::Markets => format!("sport_event_{extraction_key}"),
            Self::Outcomes => format!("sport_event_{extraction_key}_outcomes"),
            Self::Generic | Self::Schedules | Self::PlayerProps => extraction_key.to_string(),
        }
    }

    /// Derived columns dropped during flattening to bound fan-out
    ///
    /// Books inside markets repeat their outcomes, which are loaded separately
    /// by the `outcomes` collection.
    pub fn pruned_columns(self) -> &'static [&'static str] {
        match self {
            Self::Markets => &["books_outcomes"],
            Self::Generic | Self::Schedules | Self::Outcomes | Self::PlayerProps => &[],
        }
    }

    /// Lowercase name used in logs and config
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Schedules => "schedules",
            Self::Markets => "markets",
            Self::Outcomes => "outcomes",
            Self::PlayerProps => "player_props",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = SluiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "schedules" => Ok(Self::Schedules),
            "markets" => Ok(Self::Markets),
            "outcomes" => Ok(Self::Outcomes),
            "player_props" | "player-props" => Ok(Self::PlayerProps),
            _ => Err(SluiceError::Configuration(format!(
                "Invalid collection kind: {s}. Expected one of: generic, schedules, markets, outcomes, player_props"
            ))),
        }
    }
}
