use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod attribute;
pub mod error;
pub mod relationship;
pub mod source;

pub use attribute::{AttributeCategory, ConnectionAttribute, reciprocal_attributes};
pub use error::{ParseError, ValidationError};
pub use relationship::{
    RelationshipDescriptor, RelationshipType, all_types, config, config_for_key, is_bidirectional,
    is_generational, reciprocal_type,
};
pub use source::{ConnectionSink, ConnectionSource, PersonSource, Scope, SourceError};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Opaque identifier of a person, owned by the external store.
    PersonId
);
string_id!(ConnectionId);
string_id!(FamilyTreeId);
string_id!(OrganizationId);
string_id!(GroupId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStatus {
    #[default]
    Living,
    Deceased,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Free-form; commonly "male" or "female".
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Marks the tree owner's own node.
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub status: LifeStatus,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConnectionMetadata {
    #[serde(default)]
    pub attributes: std::collections::BTreeSet<ConnectionAttribute>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A stored, directed edge between two people.
///
/// Inverse meaning is derived when displayed, never stored as a second edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_person_id: PersonId,
    pub to_person_id: PersonId,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub metadata: ConnectionMetadata,
    #[serde(default)]
    pub family_tree_id: Option<FamilyTreeId>,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Connection {
    pub fn new(
        id: impl Into<ConnectionId>,
        from: impl Into<PersonId>,
        to: impl Into<PersonId>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            id: id.into(),
            from_person_id: from.into(),
            to_person_id: to.into(),
            relationship_type,
            metadata: ConnectionMetadata::default(),
            family_tree_id: None,
            organization_id: None,
            group_id: None,
        }
    }

    pub fn involves(&self, person: &PersonId) -> bool {
        &self.from_person_id == person || &self.to_person_id == person
    }

    /// The endpoint that is not `person`, if `person` is an endpoint at all.
    pub fn other_end(&self, person: &PersonId) -> Option<&PersonId> {
        if &self.from_person_id == person {
            Some(&self.to_person_id)
        } else if &self.to_person_id == person {
            Some(&self.from_person_id)
        } else {
            None
        }
    }
}

/// Direction of a connection relative to the person being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The viewpoint person is `to_person_id`.
    Incoming,
    /// The viewpoint person is `from_person_id`.
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedConnection {
    #[serde(flatten)]
    pub connection: Connection,
    pub direction: Direction,
}

impl DirectedConnection {
    pub fn new(connection: Connection, direction: Direction) -> Self {
        Self {
            connection,
            direction,
        }
    }

    pub fn viewpoint_id(&self) -> &PersonId {
        match self.direction {
            Direction::Outgoing => &self.connection.from_person_id,
            Direction::Incoming => &self.connection.to_person_id,
        }
    }

    pub fn other_person_id(&self) -> &PersonId {
        match self.direction {
            Direction::Outgoing => &self.connection.to_person_id,
            Direction::Incoming => &self.connection.from_person_id,
        }
    }
}

/// Raw relationship request as entered by a user, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionDraft {
    #[serde(default)]
    pub from_person_id: String,
    #[serde(default)]
    pub to_person_id: String,
    #[serde(default)]
    pub relationship_type: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub family_tree_id: Option<FamilyTreeId>,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl ConnectionDraft {
    pub fn new(from: &str, to: &str, relationship_type: &str) -> Self {
        Self {
            from_person_id: from.to_string(),
            to_person_id: to.to_string(),
            relationship_type: relationship_type.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes = attributes.iter().map(|a| a.to_string()).collect();
        self
    }
}

/// A validated and canonicalized connection, ready for the write interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewConnection {
    pub from_person_id: PersonId,
    pub to_person_id: PersonId,
    pub relationship_type: RelationshipType,
    pub metadata: ConnectionMetadata,
    pub family_tree_id: Option<FamilyTreeId>,
    pub organization_id: Option<OrganizationId>,
    pub group_id: Option<GroupId>,
}

impl NewConnection {
    pub fn into_connection(self, id: ConnectionId) -> Connection {
        Connection {
            id,
            from_person_id: self.from_person_id,
            to_person_id: self.to_person_id,
            relationship_type: self.relationship_type,
            metadata: self.metadata,
            family_tree_id: self.family_tree_id,
            organization_id: self.organization_id,
            group_id: self.group_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_deserializes_with_defaults() {
        let person: Person = serde_json::from_str(r#"{"id":"p1","name":"Maggie"}"#).unwrap();
        assert_eq!(person.id, PersonId::new("p1"));
        assert_eq!(person.status, LifeStatus::Living);
        assert!(!person.is_self);
        assert!(person.date_of_birth.is_none());
    }

    #[test]
    fn test_life_status_keeps_unknown_values() {
        let status: LifeStatus = serde_json::from_str(r#""missing""#).unwrap();
        assert_eq!(status, LifeStatus::Other("missing".to_string()));
        let deceased: LifeStatus = serde_json::from_str(r#""deceased""#).unwrap();
        assert_eq!(deceased, LifeStatus::Deceased);
    }

    #[test]
    fn test_directed_connection_endpoints() {
        let connection = Connection::new("c1", "maggie", "ruby", RelationshipType::Parent);
        let outgoing = DirectedConnection::new(connection.clone(), Direction::Outgoing);
        let incoming = DirectedConnection::new(connection, Direction::Incoming);

        assert_eq!(outgoing.viewpoint_id().as_str(), "maggie");
        assert_eq!(outgoing.other_person_id().as_str(), "ruby");
        assert_eq!(incoming.viewpoint_id().as_str(), "ruby");
        assert_eq!(incoming.other_person_id().as_str(), "maggie");
    }

    #[test]
    fn test_other_end() {
        let connection = Connection::new("c1", "a", "b", RelationshipType::Sibling);
        assert_eq!(connection.other_end(&"a".into()), Some(&PersonId::new("b")));
        assert_eq!(connection.other_end(&"c".into()), None);
        assert!(connection.involves(&"b".into()));
    }

    #[test]
    fn test_blank_id_is_empty() {
        assert!(PersonId::new("  ").is_empty());
        assert!(!PersonId::new("x").is_empty());
    }
}
