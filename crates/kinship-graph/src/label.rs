//! Viewpoint-relative relationship labels.
//!
//! A stored connection reads literally from its `from` end. From the `to`
//! end the reciprocal kind is shown instead: if Maggie is stored as Ruby's
//! parent, Ruby's view of that same edge says "Child".

use crate::graph::person_lookup;
use kinship_core::{
    ConnectionAttribute, DirectedConnection, Direction, Person, RelationshipType,
    reciprocal_attributes, reciprocal_type,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNKNOWN_PERSON: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLabel {
    pub label: String,
    pub description: String,
    pub other_person_name: String,
    /// Attributes as they apply from the viewpoint.
    pub attributes: Vec<ConnectionAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSummary {
    /// Connections whose other end is in the loaded set.
    pub internal: usize,
    /// Connections to people outside the loaded set.
    pub external: usize,
    pub by_label: BTreeMap<String, usize>,
}

/// Label and role noun for the viewpoint's side of a stored connection.
fn viewpoint_role(stored: RelationshipType, direction: Direction) -> (&'static str, &'static str) {
    match direction {
        Direction::Outgoing => match stored {
            RelationshipType::Parent => ("Parent", "parent"),
            RelationshipType::Child => ("Child", "child"),
            RelationshipType::Partner => ("Partner", "partner"),
            RelationshipType::Sibling => ("Sibling", "sibling"),
            RelationshipType::Donor => ("Donor", "donor"),
            RelationshipType::GestationalCarrier => {
                ("Gestational Carrier", "gestational carrier")
            }
        },
        Direction::Incoming => match stored {
            RelationshipType::Donor => ("Donor-conceived child", "donor-conceived child"),
            other => {
                let shown = reciprocal_type(other);
                viewpoint_role(shown, Direction::Outgoing)
            }
        },
    }
}

/// Describes `directed` from the viewpoint person's side.
///
/// `other_name` of `None` renders as "Unknown".
pub fn describe(
    directed: &DirectedConnection,
    viewpoint_name: &str,
    other_name: Option<&str>,
) -> RelationshipLabel {
    let stored = directed.connection.relationship_type;
    let other = other_name.unwrap_or(UNKNOWN_PERSON);
    let (label, noun) = viewpoint_role(stored, directed.direction);

    let attributes = match directed.direction {
        Direction::Outgoing => directed.connection.metadata.attributes.clone(),
        Direction::Incoming => reciprocal_attributes(stored, &directed.connection.metadata.attributes),
    };

    RelationshipLabel {
        label: label.to_string(),
        description: format!("{viewpoint_name} is {other}'s {noun}"),
        other_person_name: other.to_string(),
        attributes: attributes.into_iter().collect(),
    }
}

/// Like [`describe`], resolving the other person's name from `persons`.
pub fn describe_for_viewpoint(
    viewpoint: &Person,
    directed: &DirectedConnection,
    persons: &[Person],
) -> RelationshipLabel {
    let other = persons
        .iter()
        .find(|p| &p.id == directed.other_person_id())
        .map(|p| p.name.as_str());
    describe(directed, &viewpoint.name, other)
}

/// Counts a viewpoint's connections, splitting off those that leave the loaded set.
pub fn summarize_connections(
    viewpoint: &Person,
    directed: &[DirectedConnection],
    persons: &[Person],
) -> ConnectionSummary {
    let lookup = person_lookup(persons);
    let mut summary = ConnectionSummary::default();

    for connection in directed {
        let other = lookup.get(connection.other_person_id());
        if other.is_some() {
            summary.internal += 1;
        } else {
            summary.external += 1;
        }
        let label = describe(connection, &viewpoint.name, other.map(|p| p.name.as_str()));
        *summary.by_label.entry(label.label).or_default() += 1;
    }

    summary
}
