// View traits, the Sea-ORM backend and viewset composition

pub mod base;
pub mod model;
pub mod viewset;

pub use axum::routing::MethodRouter;
pub use base::{CreateView, DestroyView, ListView, PartialUpdateView, RetrieveView, UpdateView};
pub use model::{MergeIntoActiveModel, ModelViewSet};
pub use viewset::{RouteConfig, ViewSet};
