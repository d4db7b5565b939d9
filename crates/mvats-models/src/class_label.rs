//! Scene class labels.
//!
//! The classifier emits a distribution over a fixed, ordered set of ten
//! acoustic/visual scene categories. The order is part of the model contract:
//! index `i` of a distribution always refers to `ClassLabel::ALL[i]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of scene classes the classifier distinguishes.
pub const NUM_CLASSES: usize = 10;

/// Wire value used when no scene could be determined.
pub const UNKNOWN_CLASS: &str = "unknown";

/// Scene category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum ClassLabel {
    #[serde(rename = "airport")]
    Airport,
    #[serde(rename = "bus")]
    Bus,
    #[serde(rename = "metro(underground)")]
    Metro,
    #[serde(rename = "metro_station(underground)")]
    MetroStation,
    #[serde(rename = "park")]
    Park,
    #[serde(rename = "public_square")]
    PublicSquare,
    #[serde(rename = "shopping_mall")]
    ShoppingMall,
    #[serde(rename = "street_pedestrian")]
    StreetPedestrian,
    #[serde(rename = "street_traffic")]
    StreetTraffic,
    #[serde(rename = "tram")]
    Tram,
}

impl ClassLabel {
    /// All labels in model output order.
    pub const ALL: [ClassLabel; NUM_CLASSES] = [
        ClassLabel::Airport,
        ClassLabel::Bus,
        ClassLabel::Metro,
        ClassLabel::MetroStation,
        ClassLabel::Park,
        ClassLabel::PublicSquare,
        ClassLabel::ShoppingMall,
        ClassLabel::StreetPedestrian,
        ClassLabel::StreetTraffic,
        ClassLabel::Tram,
    ];

    /// Returns the wire name of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Airport => "airport",
            ClassLabel::Bus => "bus",
            ClassLabel::Metro => "metro(underground)",
            ClassLabel::MetroStation => "metro_station(underground)",
            ClassLabel::Park => "park",
            ClassLabel::PublicSquare => "public_square",
            ClassLabel::ShoppingMall => "shopping_mall",
            ClassLabel::StreetPedestrian => "street_pedestrian",
            ClassLabel::StreetTraffic => "street_traffic",
            ClassLabel::Tram => "tram",
        }
    }

    /// Position of this label in the model output.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Label at a model output position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Wire names of all labels, in model output order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(ClassLabel::as_str).collect()
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = ClassLabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|label| label.as_str() == s)
            .copied()
            .ok_or_else(|| ClassLabelParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown scene class: {0}")]
pub struct ClassLabelParseError(String);

/// Serde adapter for an optional label where `None` is written as `"unknown"`.
pub mod label_or_unknown {
    use super::{ClassLabel, UNKNOWN_CLASS};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(label: &Option<ClassLabel>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(label.map(|l| l.as_str()).unwrap_or(UNKNOWN_CLASS))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ClassLabel>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw == UNKNOWN_CLASS {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order_matches_indices() {
        for (i, label) in ClassLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(ClassLabel::from_index(i), Some(*label));
        }
        assert_eq!(ClassLabel::from_index(NUM_CLASSES), None);
    }

    #[test]
    fn test_label_parse() {
        assert_eq!("bus".parse::<ClassLabel>().unwrap(), ClassLabel::Bus);
        assert_eq!(
            "metro_station(underground)".parse::<ClassLabel>().unwrap(),
            ClassLabel::MetroStation
        );
        assert!("beach".parse::<ClassLabel>().is_err());
        assert!(UNKNOWN_CLASS.parse::<ClassLabel>().is_err());
    }

    #[test]
    fn test_label_serde_uses_wire_names() {
        let json = serde_json::to_string(&ClassLabel::Metro).unwrap();
        assert_eq!(json, "\"metro(underground)\"");

        let parsed: ClassLabel = serde_json::from_str("\"street_traffic\"").unwrap();
        assert_eq!(parsed, ClassLabel::StreetTraffic);
    }

    #[test]
    fn test_names_are_in_contract_order() {
        let names = ClassLabel::names();
        assert_eq!(names.len(), NUM_CLASSES);
        assert_eq!(names[0], "airport");
        assert_eq!(names[9], "tram");
    }
}
