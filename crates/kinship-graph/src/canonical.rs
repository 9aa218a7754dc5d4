//! Connection canonicalization, deduplication and validation.
//!
//! Every write goes through [`prepare_write`], so the same unordered pair of
//! people and a symmetric relationship always lands in storage the same way.

use kinship_core::{
    Connection, ConnectionAttribute, ConnectionDraft, ConnectionMetadata, NewConnection, PersonId,
    RelationshipType, ValidationError, is_bidirectional,
};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPair {
    pub from: PersonId,
    pub to: PersonId,
}

/// Stored orientation for a connection between `a` and `b`.
///
/// Symmetric kinds put the lexicographically smaller id first; directional
/// kinds keep the caller's order.
pub fn canonicalize(a: &PersonId, b: &PersonId, kind: RelationshipType) -> CanonicalPair {
    if is_bidirectional(kind) && b < a {
        CanonicalPair {
            from: b.clone(),
            to: a.clone(),
        }
    } else {
        CanonicalPair {
            from: a.clone(),
            to: b.clone(),
        }
    }
}

/// Identity of a connection for duplicate detection.
pub fn canonical_key(connection: &Connection) -> (PersonId, PersonId, RelationshipType) {
    let pair = canonicalize(
        &connection.from_person_id,
        &connection.to_person_id,
        connection.relationship_type,
    );
    (pair.from, pair.to, connection.relationship_type)
}

/// Collapses exact duplicates and mirrored symmetric pairs, keeping the first seen.
pub fn deduplicate(connections: &[Connection]) -> Vec<Connection> {
    let mut seen = HashSet::with_capacity(connections.len());
    let mut kept = Vec::with_capacity(connections.len());
    for connection in connections {
        if seen.insert(canonical_key(connection)) {
            kept.push(connection.clone());
        } else {
            tracing::debug!(
                "Dropping duplicate {} connection {} between {} and {}",
                connection.relationship_type,
                connection.id,
                connection.from_person_id,
                connection.to_person_id
            );
        }
    }
    kept
}

/// Whether `candidate` would duplicate something already in `existing`.
pub fn connection_exists(existing: &[Connection], candidate: &NewConnection) -> bool {
    let pair = canonicalize(
        &candidate.from_person_id,
        &candidate.to_person_id,
        candidate.relationship_type,
    );
    let wanted = (pair.from, pair.to, candidate.relationship_type);
    existing.iter().any(|c| canonical_key(c) == wanted)
}

struct CheckedDraft {
    relationship_type: Option<RelationshipType>,
    attributes: BTreeSet<ConnectionAttribute>,
    errors: Vec<ValidationError>,
}

fn check_draft(draft: &ConnectionDraft) -> CheckedDraft {
    let mut errors = Vec::new();
    let from = draft.from_person_id.trim();
    let to = draft.to_person_id.trim();

    if from.is_empty() {
        errors.push(ValidationError::MissingFromPerson);
    }
    if to.is_empty() {
        errors.push(ValidationError::MissingToPerson);
    }

    let relationship_type = if draft.relationship_type.trim().is_empty() {
        errors.push(ValidationError::MissingRelationshipType);
        None
    } else {
        match draft.relationship_type.parse::<RelationshipType>() {
            Ok(kind) => Some(kind),
            Err(err) => {
                errors.push(err.into());
                None
            }
        }
    };

    if !from.is_empty() && from == to {
        errors.push(ValidationError::SelfReference);
    }

    let mut attributes = BTreeSet::new();
    for tag in &draft.attributes {
        match tag.parse::<ConnectionAttribute>() {
            Ok(attribute) => {
                if let Some(kind) = relationship_type
                    && !attribute.applies_to(kind)
                {
                    errors.push(ValidationError::AttributeNotApplicable {
                        attribute: attribute.key().to_string(),
                        relationship: kind.key().to_string(),
                    });
                    continue;
                }
                attributes.insert(attribute);
            }
            Err(err) => errors.push(err.into()),
        }
    }

    CheckedDraft {
        relationship_type,
        attributes,
        errors,
    }
}

/// Every rule `draft` violates; empty means valid.
pub fn validate(draft: &ConnectionDraft) -> Vec<ValidationError> {
    check_draft(draft).errors
}

/// Rules a stored connection violates.
pub fn validate_connection(connection: &Connection) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if connection.from_person_id.is_empty() {
        errors.push(ValidationError::MissingFromPerson);
    }
    if connection.to_person_id.is_empty() {
        errors.push(ValidationError::MissingToPerson);
    }
    if !connection.from_person_id.is_empty()
        && connection.from_person_id == connection.to_person_id
    {
        errors.push(ValidationError::SelfReference);
    }
    for attribute in &connection.metadata.attributes {
        if !attribute.applies_to(connection.relationship_type) {
            errors.push(ValidationError::AttributeNotApplicable {
                attribute: attribute.key().to_string(),
                relationship: connection.relationship_type.key().to_string(),
            });
        }
    }
    errors
}

/// Validates then canonicalizes a draft into something the store may persist.
pub fn prepare_write(draft: &ConnectionDraft) -> Result<NewConnection, Vec<ValidationError>> {
    let checked = check_draft(draft);
    if !checked.errors.is_empty() {
        return Err(checked.errors);
    }
    let Some(kind) = checked.relationship_type else {
        return Err(vec![ValidationError::MissingRelationshipType]);
    };

    let pair = canonicalize(
        &PersonId::new(draft.from_person_id.trim()),
        &PersonId::new(draft.to_person_id.trim()),
        kind,
    );

    Ok(NewConnection {
        from_person_id: pair.from,
        to_person_id: pair.to,
        relationship_type: kind,
        metadata: ConnectionMetadata {
            attributes: checked.attributes,
            notes: draft.notes.clone(),
        },
        family_tree_id: draft.family_tree_id.clone(),
        organization_id: draft.organization_id.clone(),
        group_id: draft.group_id.clone(),
    })
}
