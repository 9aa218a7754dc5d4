//! Narrow interfaces to the external store that owns people and connections.

use crate::{
    Connection, DirectedConnection, Direction, FamilyTreeId, GroupId, NewConnection,
    OrganizationId, Person, PersonId,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Rejected write: {0}")]
    Rejected(String),
}

/// What slice of the store a query covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    FamilyTree(FamilyTreeId),
    Organization(OrganizationId),
    Group(GroupId),
}

impl Scope {
    pub fn matches(&self, connection: &Connection) -> bool {
        match self {
            Scope::All => true,
            Scope::FamilyTree(id) => connection.family_tree_id.as_ref() == Some(id),
            Scope::Organization(id) => connection.organization_id.as_ref() == Some(id),
            Scope::Group(id) => connection.group_id.as_ref() == Some(id),
        }
    }
}

pub trait PersonSource {
    fn persons(&self, scope: &Scope) -> Result<Vec<Person>, SourceError>;
}

pub trait ConnectionSource {
    fn connections(&self, scope: &Scope) -> Result<Vec<Connection>, SourceError>;

    fn connections_from(&self, person: &PersonId) -> Result<Vec<Connection>, SourceError>;

    fn connections_to(&self, person: &PersonId) -> Result<Vec<Connection>, SourceError>;

    /// Both queries for `person`, tagged with their direction relative to it.
    fn directed_connections(
        &self,
        person: &PersonId,
    ) -> Result<Vec<DirectedConnection>, SourceError> {
        let mut directed: Vec<DirectedConnection> = self
            .connections_from(person)?
            .into_iter()
            .map(|c| DirectedConnection::new(c, Direction::Outgoing))
            .collect();
        directed.extend(
            self.connections_to(person)?
                .into_iter()
                .map(|c| DirectedConnection::new(c, Direction::Incoming)),
        );
        Ok(directed)
    }
}

/// Persists connections that have already been validated and canonicalized.
pub trait ConnectionSink {
    fn write_connection(&mut self, connection: NewConnection) -> Result<Connection, SourceError>;

    fn delete_connection(&mut self, id: &crate::ConnectionId) -> Result<(), SourceError>;
}
