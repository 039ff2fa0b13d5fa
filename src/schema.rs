//! Per-operation schema configuration.
//!
//! A [`SchemaConfig`] maps each [`Operation`] a viewset exposes to the payload and
//! response schemas it uses. Operations missing from the map are never routed,
//! so removing an entry is enough to hide an operation the viewset implements.

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::openapi::{RefOr, schema::Schema};
use utoipa::{PartialSchema, ToSchema};

/// The CRUD operations a viewset can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Operation {
    pub const ALL: [Self; 6] = [
        Self::List,
        Self::Retrieve,
        Self::Create,
        Self::Update,
        Self::PartialUpdate,
        Self::Destroy,
    ];

    /// Name used in schema configuration keys and as the route's endpoint name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::PartialUpdate => "partial_update",
            Self::Destroy => "destroy",
        }
    }

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::List | Self::Retrieve => Method::GET,
            Self::Create => Method::POST,
            Self::Update => Method::PUT,
            Self::PartialUpdate => Method::PATCH,
            Self::Destroy => Method::DELETE,
        }
    }

    /// Path appended to the registration prefix.
    #[must_use]
    pub const fn path_suffix(self) -> &'static str {
        if self.takes_id() { "/{id}" } else { "" }
    }

    /// Status code of a successful response.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Create => StatusCode::CREATED,
            Self::Destroy => StatusCode::NO_CONTENT,
            _ => StatusCode::OK,
        }
    }

    #[must_use]
    pub const fn takes_id(self) -> bool {
        !matches!(self, Self::List | Self::Create)
    }

    #[must_use]
    pub const fn takes_payload(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::PartialUpdate)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that names no [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// A named schema, captured from a `utoipa::ToSchema` type.
#[derive(Clone)]
pub struct SchemaRef {
    name: String,
    schema: RefOr<Schema>,
    is_array: bool,
    dependencies: Vec<(String, RefOr<Schema>)>,
}

impl SchemaRef {
    #[must_use]
    pub fn of<T: ToSchema>() -> Self {
        let mut dependencies = Vec::new();
        T::schemas(&mut dependencies);
        Self {
            name: T::name().into_owned(),
            schema: <T as PartialSchema>::schema(),
            is_array: false,
            dependencies,
        }
    }

    /// A JSON array whose items are `T`.
    #[must_use]
    pub fn array_of<T: ToSchema>() -> Self {
        Self {
            is_array: true,
            ..Self::of::<T>()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schema(&self) -> &RefOr<Schema> {
        &self.schema
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Schemas referenced from inside this one.
    #[must_use]
    pub fn dependencies(&self) -> &[(String, RefOr<Schema>)] {
        &self.dependencies
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRef")
            .field("name", &self.name)
            .field("is_array", &self.is_array)
            .field("dependencies", &self.dependencies.len())
            .finish_non_exhaustive()
    }
}

/// Payload and response schema of one operation.
#[derive(Clone, Debug, Default)]
pub struct OperationSchema {
    pub payload: Option<SchemaRef>,
    pub response: Option<SchemaRef>,
}

impl OperationSchema {
    #[must_use]
    pub fn new(payload: Option<SchemaRef>, response: Option<SchemaRef>) -> Self {
        Self { payload, response }
    }

    #[must_use]
    pub fn response(response: SchemaRef) -> Self {
        Self::new(None, Some(response))
    }

    #[must_use]
    pub fn payload_and_response(payload: SchemaRef, response: SchemaRef) -> Self {
        Self::new(Some(payload), Some(response))
    }

    /// Neither payload nor response body, as for deletes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// OpenAPI overrides for one route.
///
/// `name` replaces the generated operation id, `summary` the generated
/// summary. A route with `include_in_schema` off is still served but left out
/// of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDocs {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub include_in_schema: bool,
}

impl Default for RouteDocs {
    fn default() -> Self {
        Self {
            name: None,
            summary: None,
            description: None,
            deprecated: false,
            include_in_schema: true,
        }
    }
}

impl RouteDocs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    #[must_use]
    pub fn include_in_schema(mut self, include: bool) -> Self {
        self.include_in_schema = include;
        self
    }

    /// Layer `other` on top: its texts win when set, a route stays deprecated
    /// or hidden if either side says so.
    #[must_use]
    pub fn merged(self, other: &Self) -> Self {
        Self {
            name: other.name.clone().or(self.name),
            summary: other.summary.clone().or(self.summary),
            description: other.description.clone().or(self.description),
            deprecated: self.deprecated || other.deprecated,
            include_in_schema: self.include_in_schema && other.include_in_schema,
        }
    }
}

/// The operations a viewset exposes, each with its [`OperationSchema`].
///
/// Built with `with`/`without`; iteration follows [`Operation::ALL`].
#[derive(Clone, Debug, Default)]
pub struct SchemaConfig {
    entries: BTreeMap<Operation, OperationSchema>,
}

impl SchemaConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, operation: Operation, schema: OperationSchema) -> Self {
        self.entries.insert(operation, schema);
        self
    }

    #[must_use]
    pub fn without(mut self, operation: Operation) -> Self {
        self.entries.remove(&operation);
        self
    }

    #[must_use]
    pub fn get(&self, operation: Operation) -> Option<&OperationSchema> {
        self.entries.get(&operation)
    }

    #[must_use]
    pub fn contains(&self, operation: Operation) -> bool {
        self.entries.contains_key(&operation)
    }

    /// Entries in [`Operation::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Operation, &OperationSchema)> {
        self.entries.iter().map(|(operation, schema)| (*operation, schema))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
