use thiserror::Error;

/// Failure to turn a stored or user-entered key into a known value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown relationship type: {0}")]
    UnknownRelationshipType(String),
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
}

/// A single violated rule on a relationship request.
///
/// The `Display` text is the field-level message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("From person is required")]
    MissingFromPerson,
    #[error("To person is required")]
    MissingToPerson,
    #[error("Relationship type is required")]
    MissingRelationshipType,
    #[error("Unknown relationship type: {0}")]
    UnknownRelationshipType(String),
    #[error("A person cannot have a relationship with themselves")]
    SelfReference,
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("Attribute {attribute} does not apply to {relationship} relationships")]
    AttributeNotApplicable {
        attribute: String,
        relationship: String,
    },
}

impl ValidationError {
    /// Name of the form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingFromPerson => "from_person_id",
            ValidationError::MissingToPerson | ValidationError::SelfReference => "to_person_id",
            ValidationError::MissingRelationshipType
            | ValidationError::UnknownRelationshipType(_) => "relationship_type",
            ValidationError::UnknownAttribute(_)
            | ValidationError::AttributeNotApplicable { .. } => "attributes",
        }
    }
}

impl From<ParseError> for ValidationError {
    fn from(value: ParseError) -> Self {
        match value {
            ParseError::UnknownRelationshipType(key) => ValidationError::UnknownRelationshipType(key),
            ParseError::UnknownAttribute(key) => ValidationError::UnknownAttribute(key),
        }
    }
}
