//! Known connection attributes.
//!
//! Attributes used to be free-form tags; they are now a closed set grouped
//! by category so a typo fails at the boundary instead of being stored and
//! never matched by any filter.

use crate::error::ParseError;
use crate::relationship::RelationshipType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    Biological,
    Legal,
    /// Assisted reproduction.
    Art,
    Sibling,
    Donor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionAttribute {
    // Biological
    Biological,
    NonBiological,

    // Legal
    Legal,
    Adoptive,
    Step,

    // Assisted reproduction
    DonorConceived,
    Ivf,
    Iui,
    Surrogacy,

    // Sibling
    Full,
    Half,
    DonorSibling,

    // Donor
    KnownDonor,
    AnonymousDonor,
    OpenIdDonor,
}

const ALL_ATTRIBUTES: [ConnectionAttribute; 15] = [
    ConnectionAttribute::Biological,
    ConnectionAttribute::NonBiological,
    ConnectionAttribute::Legal,
    ConnectionAttribute::Adoptive,
    ConnectionAttribute::Step,
    ConnectionAttribute::DonorConceived,
    ConnectionAttribute::Ivf,
    ConnectionAttribute::Iui,
    ConnectionAttribute::Surrogacy,
    ConnectionAttribute::Full,
    ConnectionAttribute::Half,
    ConnectionAttribute::DonorSibling,
    ConnectionAttribute::KnownDonor,
    ConnectionAttribute::AnonymousDonor,
    ConnectionAttribute::OpenIdDonor,
];

impl ConnectionAttribute {
    pub fn all() -> &'static [ConnectionAttribute] {
        &ALL_ATTRIBUTES
    }

    pub fn key(self) -> &'static str {
        match self {
            ConnectionAttribute::Biological => "biological",
            ConnectionAttribute::NonBiological => "non_biological",
            ConnectionAttribute::Legal => "legal",
            ConnectionAttribute::Adoptive => "adoptive",
            ConnectionAttribute::Step => "step",
            ConnectionAttribute::DonorConceived => "donor_conceived",
            ConnectionAttribute::Ivf => "ivf",
            ConnectionAttribute::Iui => "iui",
            ConnectionAttribute::Surrogacy => "surrogacy",
            ConnectionAttribute::Full => "full",
            ConnectionAttribute::Half => "half",
            ConnectionAttribute::DonorSibling => "donor_sibling",
            ConnectionAttribute::KnownDonor => "known_donor",
            ConnectionAttribute::AnonymousDonor => "anonymous_donor",
            ConnectionAttribute::OpenIdDonor => "open_id_donor",
        }
    }

    pub fn category(self) -> AttributeCategory {
        match self {
            ConnectionAttribute::Biological | ConnectionAttribute::NonBiological => {
                AttributeCategory::Biological
            }
            ConnectionAttribute::Legal | ConnectionAttribute::Adoptive | ConnectionAttribute::Step => {
                AttributeCategory::Legal
            }
            ConnectionAttribute::DonorConceived
            | ConnectionAttribute::Ivf
            | ConnectionAttribute::Iui
            | ConnectionAttribute::Surrogacy => AttributeCategory::Art,
            ConnectionAttribute::Full
            | ConnectionAttribute::Half
            | ConnectionAttribute::DonorSibling => AttributeCategory::Sibling,
            ConnectionAttribute::KnownDonor
            | ConnectionAttribute::AnonymousDonor
            | ConnectionAttribute::OpenIdDonor => AttributeCategory::Donor,
        }
    }

    /// Whether this attribute is meaningful on a connection of `kind`.
    pub fn applies_to(self, kind: RelationshipType) -> bool {
        match self.category() {
            AttributeCategory::Sibling => kind == RelationshipType::Sibling,
            AttributeCategory::Donor => kind == RelationshipType::Donor,
            AttributeCategory::Biological | AttributeCategory::Legal | AttributeCategory::Art => true,
        }
    }
}

impl fmt::Display for ConnectionAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConnectionAttribute {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ALL_ATTRIBUTES
            .iter()
            .copied()
            .find(|attr| attr.key() == normalized)
            .ok_or_else(|| ParseError::UnknownAttribute(value.to_string()))
    }
}

/// Which attribute categories survive onto the derived reciprocal side.
///
/// This is a starting configuration, not a settled domain rule.
pub const RECIPROCAL_ATTRIBUTE_RULES: &[(RelationshipType, &[AttributeCategory])] = &[
    (
        RelationshipType::Sibling,
        &[
            AttributeCategory::Sibling,
            AttributeCategory::Biological,
            AttributeCategory::Art,
        ],
    ),
    (RelationshipType::Partner, &[AttributeCategory::Legal]),
    (
        RelationshipType::Parent,
        &[
            AttributeCategory::Biological,
            AttributeCategory::Legal,
            AttributeCategory::Art,
        ],
    ),
    (
        RelationshipType::Child,
        &[
            AttributeCategory::Biological,
            AttributeCategory::Legal,
            AttributeCategory::Art,
        ],
    ),
    (
        RelationshipType::Donor,
        &[AttributeCategory::Donor, AttributeCategory::Art],
    ),
    (RelationshipType::GestationalCarrier, &[AttributeCategory::Art]),
];

/// Attributes of a `kind` connection that carry over when it is read from the other end.
pub fn reciprocal_attributes(
    kind: RelationshipType,
    attributes: &BTreeSet<ConnectionAttribute>,
) -> BTreeSet<ConnectionAttribute> {
    let kept = RECIPROCAL_ATTRIBUTE_RULES
        .iter()
        .find(|(rule_kind, _)| *rule_kind == kind)
        .map(|(_, categories)| *categories)
        .unwrap_or(&[]);

    attributes
        .iter()
        .copied()
        .filter(|attr| kept.contains(&attr.category()))
        .collect()
}
