//! Relationship type registry.
//!
//! Static catalog of the canonical relationship kinds, how each one is
//! labelled and styled, whether its meaning depends on the viewpoint, and
//! which kind it turns into when read from the other end.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    #[serde(alias = "biological_parent", alias = "social_parent")]
    Parent,
    Child,
    #[serde(alias = "spouse")]
    Partner,
    #[serde(alias = "half_sibling", alias = "step_sibling")]
    Sibling,
    Donor,
    GestationalCarrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    /// `None` only for the fallback descriptor of unknown keys.
    pub kind: Option<RelationshipType>,
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Hex color, `#rrggbb`.
    pub color: &'static str,
    pub is_bidirectional: bool,
    pub reciprocal: Option<RelationshipType>,
}

const ALL_TYPES: [RelationshipType; 6] = [
    RelationshipType::Parent,
    RelationshipType::Child,
    RelationshipType::Partner,
    RelationshipType::Sibling,
    RelationshipType::Donor,
    RelationshipType::GestationalCarrier,
];

const PARENT: RelationshipDescriptor = RelationshipDescriptor {
    kind: Some(RelationshipType::Parent),
    key: "parent",
    label: "Parent",
    icon: "user-round",
    color: "#3b82f6",
    is_bidirectional: false,
    reciprocal: Some(RelationshipType::Child),
};

const CHILD: RelationshipDescriptor = RelationshipDescriptor {
    kind: Some(RelationshipType::Child),
    key: "child",
    label: "Child",
    icon: "baby",
    color: "#22c55e",
    is_bidirectional: false,
    reciprocal: Some(RelationshipType::Parent),
};

const PARTNER: RelationshipDescriptor = RelationshipDescriptor {
    kind: Some(RelationshipType::Partner),
    key: "partner",
    label: "Partner",
    icon: "heart",
    color: "#ec4899",
    is_bidirectional: true,
    reciprocal: Some(RelationshipType::Partner),
};

const SIBLING: RelationshipDescriptor = RelationshipDescriptor {
    kind: Some(RelationshipType::Sibling),
    key: "sibling",
    label: "Sibling",
    icon: "users",
    color: "#f59e0b",
    is_bidirectional: true,
    reciprocal: Some(RelationshipType::Sibling),
};

const DONOR: RelationshipDescriptor = RelationshipDescriptor {
    kind: Some(RelationshipType::Donor),
    key: "donor",
    label: "Donor",
    icon: "dna",
    color: "#8b5cf6",
    is_bidirectional: false,
    reciprocal: Some(RelationshipType::Child),
};

const GESTATIONAL_CARRIER: RelationshipDescriptor = RelationshipDescriptor {
    kind: Some(RelationshipType::GestationalCarrier),
    key: "gestational_carrier",
    label: "Gestational Carrier",
    icon: "hand-heart",
    color: "#14b8a6",
    is_bidirectional: false,
    reciprocal: Some(RelationshipType::Child),
};

/// Styling used for keys the registry does not know.
pub const FALLBACK: RelationshipDescriptor = RelationshipDescriptor {
    kind: None,
    key: "unknown",
    label: "Related",
    icon: "link",
    color: "#6b7280",
    is_bidirectional: false,
    reciprocal: None,
};

impl RelationshipType {
    pub fn key(self) -> &'static str {
        config(self).key
    }

    pub fn label(self) -> &'static str {
        config(self).label
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RelationshipType {
    type Err = ParseError;

    /// Accepts canonical keys and the legacy synonyms still found in older data.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parent" | "biological_parent" | "social_parent" => Ok(RelationshipType::Parent),
            "child" => Ok(RelationshipType::Child),
            "partner" | "spouse" => Ok(RelationshipType::Partner),
            "sibling" | "half_sibling" | "step_sibling" => Ok(RelationshipType::Sibling),
            "donor" => Ok(RelationshipType::Donor),
            "gestational_carrier" => Ok(RelationshipType::GestationalCarrier),
            _ => Err(ParseError::UnknownRelationshipType(value.to_string())),
        }
    }
}

pub fn all_types() -> &'static [RelationshipType] {
    &ALL_TYPES
}

pub fn config(kind: RelationshipType) -> &'static RelationshipDescriptor {
    match kind {
        RelationshipType::Parent => &PARENT,
        RelationshipType::Child => &CHILD,
        RelationshipType::Partner => &PARTNER,
        RelationshipType::Sibling => &SIBLING,
        RelationshipType::Donor => &DONOR,
        RelationshipType::GestationalCarrier => &GESTATIONAL_CARRIER,
    }
}

/// Looks up a descriptor by its stored key, falling back to neutral styling.
pub fn config_for_key(key: &str) -> &'static RelationshipDescriptor {
    key.parse::<RelationshipType>()
        .map(config)
        .unwrap_or(&FALLBACK)
}

pub fn is_bidirectional(kind: RelationshipType) -> bool {
    config(kind).is_bidirectional
}

pub fn reciprocal_type(kind: RelationshipType) -> RelationshipType {
    config(kind).reciprocal.unwrap_or(kind)
}

/// Whether an edge of this kind puts its endpoints in different generations.
pub fn is_generational(kind: RelationshipType) -> bool {
    matches!(
        kind,
        RelationshipType::Parent
            | RelationshipType::Child
            | RelationshipType::Donor
            | RelationshipType::GestationalCarrier
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_canonical_types() {
        let keys: Vec<_> = all_types().iter().map(|t| t.key()).collect();
        assert_eq!(
            keys,
            vec![
                "parent",
                "child",
                "partner",
                "sibling",
                "donor",
                "gestational_carrier"
            ]
        );
    }

    #[test]
    fn test_spouse_alias_resolves_to_partner() {
        assert_eq!(config_for_key("spouse"), config(RelationshipType::Partner));
        let parsed: RelationshipType = serde_json::from_str(r#""spouse""#).unwrap();
        assert_eq!(parsed, RelationshipType::Partner);
    }

    #[test]
    fn test_legacy_keys_deserialize() {
        for (raw, expected) in [
            (r#""biological_parent""#, RelationshipType::Parent),
            (r#""social_parent""#, RelationshipType::Parent),
            (r#""half_sibling""#, RelationshipType::Sibling),
            (r#""step_sibling""#, RelationshipType::Sibling),
        ] {
            let parsed: RelationshipType = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected, "{raw}");
        }
    }

    #[test]
    fn test_descriptor_kind_matches_lookup() {
        for &kind in all_types() {
            assert_eq!(config(kind).kind, Some(kind));
        }
        assert_eq!(config_for_key("cousin").kind, None);
    }

    #[test]
    fn test_reciprocal_map() {
        use RelationshipType::*;
        assert_eq!(reciprocal_type(Parent), Child);
        assert_eq!(reciprocal_type(Child), Parent);
        assert_eq!(reciprocal_type(Donor), Child);
        assert_eq!(reciprocal_type(GestationalCarrier), Child);
        assert_eq!(reciprocal_type(Sibling), Sibling);
        assert_eq!(reciprocal_type(Partner), Partner);
    }

    #[test]
    fn test_bidirectional_flags() {
        use RelationshipType::*;
        assert!(is_bidirectional(Sibling));
        assert!(is_bidirectional(Partner));
        assert!(!is_bidirectional(Parent));
        assert!(!is_bidirectional(Child));
        assert!(!is_bidirectional(Donor));
        assert!(!is_bidirectional(GestationalCarrier));
    }

    #[test]
    fn test_unknown_key_uses_fallback() {
        let descriptor = config_for_key("cousin");
        assert_eq!(descriptor.label, "Related");
        assert!(descriptor.reciprocal.is_none());
        assert!("cousin".parse::<RelationshipType>().is_err());
    }

    #[test]
    fn test_legacy_parent_and_sibling_keys() {
        assert_eq!(
            "biological_parent".parse::<RelationshipType>().unwrap(),
            RelationshipType::Parent
        );
        assert_eq!(
            "Half_Sibling".parse::<RelationshipType>().unwrap(),
            RelationshipType::Sibling
        );
    }

    #[test]
    fn test_generational_classification() {
        assert!(is_generational(RelationshipType::Donor));
        assert!(!is_generational(RelationshipType::Sibling));
        assert!(!is_generational(RelationshipType::Partner));
    }
}
