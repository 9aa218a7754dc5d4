//! JSON family files.
//!
//! A [`FamilyProject`] is a snapshot of one family's people and connections,
//! standing in for the external store behind the source and sink traits.

pub mod settings;

pub use settings::Settings;

use chrono::{DateTime, Utc};
use kinship_core::{
    Connection, ConnectionDraft, ConnectionId, ConnectionSink, ConnectionSource, NewConnection,
    Person, PersonId, PersonSource, Scope, SourceError, ValidationError,
};
use kinship_graph::{canonical_key, connection_exists, prepare_write, validate_connection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

pub const FAMILY_FILE_VERSION: u32 = 1;
pub const DEFAULT_FILE_NAME: &str = "kinship_family.json";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported family file version {0}")]
    UnsupportedVersion(u32),
    #[error("Invalid connection: {}", join_messages(.0))]
    InvalidConnection(Vec<ValidationError>),
    #[error("Person {0} already exists")]
    DuplicatePerson(PersonId),
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
    #[error(transparent)]
    Source(#[from] SourceError),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyFile {
    pub name: String,
    pub version: u32,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FamilyFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: FAMILY_FILE_VERSION,
            people: Vec::new(),
            connections: Vec::new(),
            updated_at: None,
        }
    }
}

/// Problems found in a loaded family file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Connection id and the human-readable messages for each rule it breaks.
    pub invalid: Vec<(ConnectionId, Vec<String>)>,
    /// Connections with an endpoint that is not in the file.
    pub stale: Vec<ConnectionId>,
    /// Connections that repeat an earlier one once canonicalized.
    pub duplicates: Vec<ConnectionId>,
    pub duplicate_people: Vec<PersonId>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
            && self.stale.is_empty()
            && self.duplicates.is_empty()
            && self.duplicate_people.is_empty()
    }
}

pub struct FamilyProject {
    pub file: FamilyFile,
    pub path: PathBuf,
}

impl FamilyProject {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            file: FamilyFile::new(name),
            path,
        }
    }

    pub fn load(path: PathBuf) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(&path).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;
        let file: FamilyFile = serde_json::from_str(&content)?;
        if file.version > FAMILY_FILE_VERSION {
            return Err(ProjectError::UnsupportedVersion(file.version));
        }
        tracing::debug!(
            "Loaded {} people and {} connections from {}",
            file.people.len(),
            file.connections.len(),
            path.display()
        );
        Ok(Self { file, path })
    }

    pub fn save(&mut self) -> Result<(), ProjectError> {
        self.file.updated_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.path, content).map_err(|source| ProjectError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Loads `path` when it is a file, or the default family file inside it when it is a directory.
    /// A missing file yields an empty project named after its parent directory.
    pub fn open(path: &Path) -> Result<Self, ProjectError> {
        let file_path = if path.is_dir() {
            path.join(DEFAULT_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        if file_path.exists() {
            return Self::load(file_path);
        }
        let name = file_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Family")
            .to_string();
        Ok(Self::new(name, file_path))
    }

    pub fn people(&self) -> &[Person] {
        &self.file.people
    }

    pub fn connections(&self) -> &[Connection] {
        &self.file.connections
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.file.people.iter().find(|p| &p.id == id)
    }

    pub fn add_person(&mut self, person: Person) -> Result<(), ProjectError> {
        if self.person(&person.id).is_some() {
            return Err(ProjectError::DuplicatePerson(person.id));
        }
        self.file.people.push(person);
        Ok(())
    }

    /// Removes a person together with every connection touching them.
    pub fn remove_person(&mut self, id: &PersonId) -> Option<Person> {
        let position = self.file.people.iter().position(|p| &p.id == id)?;
        let before = self.file.connections.len();
        self.file.connections.retain(|c| !c.involves(id));
        tracing::debug!(
            "Removed {} with {} connections",
            id,
            before - self.file.connections.len()
        );
        Some(self.file.people.remove(position))
    }

    /// Validates, canonicalizes and stores a connection typed in by a user.
    pub fn add_connection(&mut self, draft: &ConnectionDraft) -> Result<Connection, ProjectError> {
        let candidate = prepare_write(draft).map_err(ProjectError::InvalidConnection)?;
        for endpoint in [&candidate.from_person_id, &candidate.to_person_id] {
            if self.person(endpoint).is_none() {
                return Err(SourceError::NotFound(format!("person {endpoint}")).into());
            }
        }
        Ok(self.write_connection(candidate)?)
    }

    /// Checks every stored connection the way a fresh write would be checked.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let mut seen_people = HashSet::new();
        for person in &self.file.people {
            if !seen_people.insert(&person.id) {
                report.duplicate_people.push(person.id.clone());
            }
        }

        let mut seen_keys = HashSet::new();
        for connection in &self.file.connections {
            let errors = validate_connection(connection);
            if !errors.is_empty() {
                let messages = errors.iter().map(|e| e.to_string()).collect();
                report.invalid.push((connection.id.clone(), messages));
            }
            if !seen_people.contains(&connection.from_person_id)
                || !seen_people.contains(&connection.to_person_id)
            {
                report.stale.push(connection.id.clone());
            }
            if !seen_keys.insert(canonical_key(connection)) {
                report.duplicates.push(connection.id.clone());
            }
        }

        report
    }
}

impl PersonSource for FamilyProject {
    fn persons(&self, scope: &Scope) -> Result<Vec<Person>, SourceError> {
        if *scope == Scope::All {
            return Ok(self.file.people.clone());
        }
        // People carry no scope of their own; they belong to a scope through its connections.
        let members: HashSet<&PersonId> = self
            .file
            .connections
            .iter()
            .filter(|c| scope.matches(c))
            .flat_map(|c| [&c.from_person_id, &c.to_person_id])
            .collect();
        Ok(self
            .file
            .people
            .iter()
            .filter(|p| members.contains(&p.id))
            .cloned()
            .collect())
    }
}

impl ConnectionSource for FamilyProject {
    fn connections(&self, scope: &Scope) -> Result<Vec<Connection>, SourceError> {
        Ok(self
            .file
            .connections
            .iter()
            .filter(|c| scope.matches(c))
            .cloned()
            .collect())
    }

    fn connections_from(&self, person: &PersonId) -> Result<Vec<Connection>, SourceError> {
        Ok(self
            .file
            .connections
            .iter()
            .filter(|c| &c.from_person_id == person)
            .cloned()
            .collect())
    }

    fn connections_to(&self, person: &PersonId) -> Result<Vec<Connection>, SourceError> {
        Ok(self
            .file
            .connections
            .iter()
            .filter(|c| &c.to_person_id == person)
            .cloned()
            .collect())
    }
}

impl ConnectionSink for FamilyProject {
    fn write_connection(&mut self, connection: NewConnection) -> Result<Connection, SourceError> {
        if connection_exists(&self.file.connections, &connection) {
            return Err(SourceError::Rejected(format!(
                "{} between {} and {} already exists",
                connection.relationship_type, connection.from_person_id, connection.to_person_id
            )));
        }
        let id = ConnectionId::new(Uuid::new_v4().to_string());
        let stored = connection.into_connection(id);
        self.file.connections.push(stored.clone());
        Ok(stored)
    }

    fn delete_connection(&mut self, id: &ConnectionId) -> Result<(), SourceError> {
        let before = self.file.connections.len();
        self.file.connections.retain(|c| &c.id != id);
        if self.file.connections.len() == before {
            return Err(SourceError::NotFound(format!("connection {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::{Direction, RelationshipType};
    use tempfile::tempdir;

    fn project_with_people(ids: &[&str]) -> FamilyProject {
        let mut project = FamilyProject::new("Test", PathBuf::from("unused.json"));
        for id in ids {
            project.add_person(Person::new(*id, id.to_uppercase())).unwrap();
        }
        project
    }

    #[test]
    fn test_add_connection_canonicalizes_and_assigns_uuid() {
        let mut project = project_with_people(&["bob", "alice"]);
        let stored = project
            .add_connection(&ConnectionDraft::new("bob", "alice", "spouse"))
            .unwrap();

        assert_eq!(stored.relationship_type, RelationshipType::Partner);
        assert_eq!(stored.from_person_id.as_str(), "alice");
        assert_eq!(stored.to_person_id.as_str(), "bob");
        assert!(Uuid::parse_str(stored.id.as_str()).is_ok());
    }

    #[test]
    fn test_reversed_duplicate_is_rejected() {
        let mut project = project_with_people(&["a", "b"]);
        project
            .add_connection(&ConnectionDraft::new("a", "b", "sibling"))
            .unwrap();
        let err = project
            .add_connection(&ConnectionDraft::new("b", "a", "sibling"))
            .unwrap_err();
        assert!(matches!(err, ProjectError::Source(SourceError::Rejected(_))));
        assert_eq!(project.connections().len(), 1);
    }

    #[test]
    fn test_invalid_draft_reports_all_errors() {
        let mut project = project_with_people(&["a"]);
        let err = project
            .add_connection(&ConnectionDraft::new("", "", "cousin"))
            .unwrap_err();
        match err {
            ProjectError::InvalidConnection(errors) => assert!(errors.len() >= 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_endpoint_is_not_found() {
        let mut project = project_with_people(&["a"]);
        let err = project
            .add_connection(&ConnectionDraft::new("a", "ghost", "parent"))
            .unwrap_err();
        assert!(matches!(err, ProjectError::Source(SourceError::NotFound(_))));
    }

    #[test]
    fn test_directed_connections_tag_both_sides() {
        let mut project = project_with_people(&["mum", "kid"]);
        project
            .add_connection(&ConnectionDraft::new("mum", "kid", "parent"))
            .unwrap();

        let directed = project.directed_connections(&"kid".into()).unwrap();
        assert_eq!(directed.len(), 1);
        assert_eq!(directed[0].direction, Direction::Incoming);
        assert_eq!(directed[0].other_person_id().as_str(), "mum");
    }

    #[test]
    fn test_scope_filters_people_through_connections() {
        let mut project = project_with_people(&["a", "b", "c"]);
        let mut connection = Connection::new("e1", "a", "b", RelationshipType::Sibling);
        connection.family_tree_id = Some("tree-1".into());
        project.file.connections.push(connection);

        let scope = Scope::FamilyTree("tree-1".into());
        let people = project.persons(&scope).unwrap();
        let ids: Vec<_> = people.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(project.persons(&Scope::All).unwrap().len(), 3);
    }

    #[test]
    fn test_remove_person_cascades() {
        let mut project = project_with_people(&["a", "b"]);
        project
            .add_connection(&ConnectionDraft::new("a", "b", "parent"))
            .unwrap();
        assert!(project.remove_person(&"a".into()).is_some());
        assert!(project.connections().is_empty());
        assert!(project.remove_person(&"a".into()).is_none());
    }

    #[test]
    fn test_delete_missing_connection() {
        let mut project = project_with_people(&["a"]);
        assert!(matches!(
            project.delete_connection(&"nope".into()),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut project = project_with_people(&["a", "b"]);
        project.file.people.push(Person::new("a", "Again"));
        project.file.connections.extend([
            Connection::new("e1", "a", "b", RelationshipType::Partner),
            Connection::new("e2", "b", "a", RelationshipType::Partner),
            Connection::new("e3", "a", "ghost", RelationshipType::Parent),
            Connection::new("e4", "a", "a", RelationshipType::Parent),
        ]);

        let report = project.validate();
        assert!(!report.is_clean());
        assert_eq!(report.duplicate_people, vec![PersonId::from("a")]);
        assert_eq!(report.duplicates, vec![ConnectionId::from("e2")]);
        assert_eq!(report.stale, vec![ConnectionId::from("e3")]);
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].0.as_str(), "e4");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_FILE_NAME);
        let mut project = FamilyProject::open(dir.path()).unwrap();
        assert!(project.people().is_empty());
        project.add_person(Person::new("a", "Ada")).unwrap();
        project.add_person(Person::new("b", "Bo")).unwrap();
        project
            .add_connection(&ConnectionDraft::new("a", "b", "parent").with_attributes(&["biological"]))
            .unwrap();
        project.save().unwrap();

        let reloaded = FamilyProject::load(path).unwrap();
        assert_eq!(reloaded.people(), project.people());
        assert_eq!(reloaded.connections(), project.connections());
        assert!(reloaded.file.updated_at.is_some());
        assert!(reloaded.validate().is_clean());
    }

    #[test]
    fn test_legacy_relationship_keys_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("family.json");
        fs::write(
            &path,
            r#"{
                "name": "Legacy",
                "version": 1,
                "people": [
                    { "id": "a", "name": "A" },
                    { "id": "b", "name": "B" },
                    { "id": "c", "name": "C" }
                ],
                "connections": [
                    { "id": "e1", "from_person_id": "a", "to_person_id": "b", "relationship_type": "spouse" },
                    { "id": "e2", "from_person_id": "a", "to_person_id": "c", "relationship_type": "biological_parent" },
                    { "id": "e3", "from_person_id": "b", "to_person_id": "c", "relationship_type": "social_parent" },
                    { "id": "e4", "from_person_id": "b", "to_person_id": "c", "relationship_type": "half_sibling" },
                    { "id": "e5", "from_person_id": "a", "to_person_id": "c", "relationship_type": "step_sibling" }
                ]
            }"#,
        )
        .unwrap();

        let project = FamilyProject::load(path).unwrap();
        let kinds: Vec<RelationshipType> = project
            .connections()
            .iter()
            .map(|c| c.relationship_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                RelationshipType::Partner,
                RelationshipType::Parent,
                RelationshipType::Parent,
                RelationshipType::Sibling,
                RelationshipType::Sibling,
            ]
        );
    }

    #[test]
    fn test_newer_file_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("family.json");
        fs::write(&path, r#"{ "name": "F", "version": 99 }"#).unwrap();
        assert!(matches!(
            FamilyProject::load(path),
            Err(ProjectError::UnsupportedVersion(99))
        ));
    }
}
