//! Composable CRUD views for Axum and Sea-ORM.
//!
//! - view traits (`ListView`, `RetrieveView`, `CreateView`, `UpdateView`,
//!   `PartialUpdateView`, `DestroyView`) map HTTP verbs to extension points
//! - `ModelViewSet` implements those extension points with Sea-ORM
//! - `viewset!` composes a type from the views it exposes
//! - `RestRouter` registers a viewset's routes under a prefix
//! - `db_dep_injector` / `auth_dep_injector` put the session and user on the request state

pub mod deps;
pub mod errors;
pub mod openapi;
pub mod routes;
pub mod schema;
pub mod state;
pub mod views;

pub use deps::{
    AuthInjector, Dependency, FromExtractor, SessionInjector, SessionProvider, UserProvider,
    auth_dep_injector, db_dep_injector,
};
pub use errors::ApiError;
pub use routes::{RegisterOptions, RegisteredRoute, RestRouter};
pub use schema::{Operation, OperationSchema, RouteDocs, SchemaConfig, SchemaRef};
pub use state::RequestState;
pub use views::{
    CreateView, DestroyView, ListView, MergeIntoActiveModel, ModelViewSet, PartialUpdateView,
    RetrieveView, RouteConfig, UpdateView, ViewSet,
};
