//! The router extension: registers every route of a viewset under a prefix.
//!
//! ```rust,ignore
//! let mut router = RestRouter::new();
//! router.register_viewset::<TodoViewSet>(
//!     "/todos",
//!     RegisterOptions::new()
//!         .tag("todos")
//!         .dependency(db_dep_injector(db.clone())),
//! );
//! let app: axum::Router = router.into_router();
//! ```

use axum::Router;
use axum::http::{Method, StatusCode};
use axum::middleware;
use axum::routing::MethodRouter;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::openapi::OpenApi;

use crate::deps::{Dependency, DependencyChain, run_dependencies};
use crate::openapi::build_openapi;
use crate::schema::{Operation, OperationSchema, RouteDocs};
use crate::views::ViewSet;

/// Tags, dependencies and docs applied to the routes of one registration.
#[derive(Clone, Default)]
pub struct RegisterOptions {
    tags: Vec<String>,
    dependencies: Vec<Arc<dyn Dependency>>,
    docs: RouteDocs,
    route_docs: BTreeMap<Operation, RouteDocs>,
}

impl RegisterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Dependencies run in the order they are added.
    #[must_use]
    pub fn dependency<D: Dependency>(mut self, dependency: D) -> Self {
        self.dependencies.push(Arc::new(dependency));
        self
    }

    #[must_use]
    pub fn shared_dependency(mut self, dependency: Arc<dyn Dependency>) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Mark every route deprecated in the OpenAPI document.
    #[must_use]
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.docs.deprecated = deprecated;
        self
    }

    /// Leave every route out of the OpenAPI document; they are still served.
    #[must_use]
    pub fn include_in_schema(mut self, include: bool) -> Self {
        self.docs.include_in_schema = include;
        self
    }

    /// Overrides for one operation, layered over the viewset's `route_docs`.
    #[must_use]
    pub fn route_docs(mut self, operation: Operation, docs: RouteDocs) -> Self {
        self.route_docs.insert(operation, docs);
        self
    }

    fn docs_for(&self, operation: Operation, from_viewset: RouteDocs) -> RouteDocs {
        let docs = from_viewset.merged(&self.docs);
        match self.route_docs.get(&operation) {
            Some(overrides) => docs.merged(overrides),
            None => docs,
        }
    }
}

/// What the router remembers about a registered route.
#[derive(Clone, Debug)]
pub struct RegisteredRoute {
    pub operation: Operation,
    pub method: Method,
    pub prefix: String,
    pub path: String,
    pub endpoint_name: &'static str,
    pub status_code: StatusCode,
    pub tags: Vec<String>,
    pub schema: OperationSchema,
    pub docs: RouteDocs,
    pub dependency_count: usize,
}

pub struct RestRouter<S = ()> {
    router: Router<S>,
    routes: Vec<RegisteredRoute>,
}

impl<S> RestRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            routes: Vec::new(),
        }
    }

    /// Register a default-constructed `V`.
    pub fn register_viewset<V>(&mut self, prefix: &str, options: RegisterOptions) -> &mut Self
    where
        V: ViewSet + Default,
    {
        self.register(V::default(), prefix, options)
    }

    /// Register every route `viewset` declares under `prefix`.
    ///
    /// # Panics
    ///
    /// Axum panics when a method and path pair is registered twice.
    pub fn register<V>(&mut self, viewset: V, prefix: &str, options: RegisterOptions) -> &mut Self
    where
        V: ViewSet,
    {
        for route in Arc::new(viewset).routes_config::<S>() {
            let path = join_path(prefix, route.path);
            let dependencies: Vec<Arc<dyn Dependency>> = route
                .dependencies
                .into_iter()
                .chain(options.dependencies.iter().cloned())
                .collect();

            tracing::debug!(
                method = %route.method,
                %path,
                endpoint = route.endpoint_name,
                dependencies = dependencies.len(),
                "Registering route"
            );

            let handler = with_dependencies(route.handler, &dependencies);
            self.router = std::mem::take(&mut self.router).route(&path, handler);
            self.routes.push(RegisteredRoute {
                operation: route.operation,
                method: route.method,
                prefix: prefix.to_string(),
                path,
                endpoint_name: route.endpoint_name,
                status_code: route.status_code,
                tags: options.tags.clone(),
                schema: route.schema,
                docs: options.docs_for(route.operation, route.docs),
                dependency_count: dependencies.len(),
            });
        }
        self
    }

    #[must_use]
    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    /// OpenAPI document describing every registered route.
    #[must_use]
    pub fn openapi(&self, title: &str, version: &str) -> OpenApi {
        build_openapi(&self.routes, title, version)
    }

    #[must_use]
    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

impl<S> Default for RestRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> From<RestRouter<S>> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn from(router: RestRouter<S>) -> Self {
        router.into_router()
    }
}

fn with_dependencies<S>(handler: MethodRouter<S>, dependencies: &[Arc<dyn Dependency>]) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    if dependencies.is_empty() {
        return handler;
    }
    let chain: DependencyChain = dependencies.iter().cloned().collect();
    handler.route_layer(middleware::from_fn_with_state(chain, run_dependencies))
}

fn join_path(prefix: &str, suffix: &str) -> String {
    let path = format!("{}{suffix}", prefix.trim_end_matches('/'));
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}
