use axum::http::{Method, StatusCode};
use axum::routing::MethodRouter;
use std::sync::Arc;

use crate::deps::Dependency;
use crate::schema::{Operation, OperationSchema, RouteDocs, SchemaConfig};

/// One route a viewset wants registered, before the router prefixes it.
pub struct RouteConfig<S = ()> {
    pub operation: Operation,
    pub method: Method,
    /// Suffix appended to the registration prefix: `""` or `"/{id}"`.
    pub path: &'static str,
    pub endpoint_name: &'static str,
    pub status_code: StatusCode,
    pub schema: OperationSchema,
    pub docs: RouteDocs,
    pub handler: MethodRouter<S>,
    pub dependencies: Vec<Arc<dyn Dependency>>,
}

/// A resource's set of views.
///
/// Usually implemented with [`viewset!`](crate::viewset), which composes the
/// view traits a type implements. Implement it by hand to build the schema
/// configuration yourself, e.g. to hide an operation:
///
/// ```rust,ignore
/// impl ViewSet for ReadOnlyTodos {
///     fn schema_config(&self) -> SchemaConfig {
///         SchemaConfig::new()
///             .with(Operation::List, <Self as ListView>::list_schema())
///             .with(Operation::Retrieve, <Self as RetrieveView>::retrieve_schema())
///     }
///
///     fn view_handler<S>(self: Arc<Self>, operation: Operation) -> Option<MethodRouter<S>>
///     where
///         S: Clone + Send + Sync + 'static,
///     {
///         match operation {
///             Operation::List => Some(self.list_route()),
///             Operation::Retrieve => Some(self.retrieve_route()),
///             _ => None,
///         }
///     }
/// }
/// ```
///
/// The schemas in `schema_config` only feed the OpenAPI document; they are not
/// checked against the handler's payload and response types. Build entries from
/// the views' `*_schema()` defaults, as above, so the two cannot drift apart.
pub trait ViewSet: Send + Sync + 'static {
    /// Operations to expose and their schemas. Nothing outside it is routed.
    fn schema_config(&self) -> SchemaConfig;

    /// The handler for `operation`, or `None` if this viewset lacks the view.
    fn view_handler<S>(self: Arc<Self>, operation: Operation) -> Option<MethodRouter<S>>
    where
        S: Clone + Send + Sync + 'static;

    /// Dependencies for a single operation; they run before the ones passed at registration.
    fn route_dependencies(&self, _operation: Operation) -> Vec<Arc<dyn Dependency>> {
        Vec::new()
    }

    /// OpenAPI overrides for a single operation.
    fn route_docs(&self, _operation: Operation) -> RouteDocs {
        RouteDocs::default()
    }

    fn routes_config<S>(self: Arc<Self>) -> Vec<RouteConfig<S>>
    where
        S: Clone + Send + Sync + 'static,
        Self: Sized,
    {
        let config = self.schema_config();
        let mut routes = Vec::with_capacity(config.len());
        for (operation, schema) in config.iter() {
            let Some(handler) = Arc::clone(&self).view_handler(operation) else {
                tracing::warn!(%operation, "Schema configured for an operation the viewset does not implement");
                continue;
            };
            routes.push(RouteConfig {
                operation,
                method: operation.method(),
                path: operation.path_suffix(),
                endpoint_name: operation.as_str(),
                status_code: operation.status_code(),
                schema: schema.clone(),
                docs: self.route_docs(operation),
                handler,
                dependencies: self.route_dependencies(operation),
            });
        }
        routes
    }
}

/// Implement [`ViewSet`] for a type from the view traits it should expose.
///
/// ```rust,ignore
/// viewset!(TodoViewSet => [ListView, RetrieveView, CreateView, UpdateView, DestroyView]);
/// ```
///
/// Accepted views: `ListView`, `RetrieveView`, `CreateView`, `UpdateView`,
/// `PartialUpdateView`, `DestroyView`.
#[macro_export]
macro_rules! viewset {
    (@operation ListView) => { $crate::schema::Operation::List };
    (@operation RetrieveView) => { $crate::schema::Operation::Retrieve };
    (@operation CreateView) => { $crate::schema::Operation::Create };
    (@operation UpdateView) => { $crate::schema::Operation::Update };
    (@operation PartialUpdateView) => { $crate::schema::Operation::PartialUpdate };
    (@operation DestroyView) => { $crate::schema::Operation::Destroy };

    (@schema ListView) => { <Self as $crate::views::ListView>::list_schema() };
    (@schema RetrieveView) => { <Self as $crate::views::RetrieveView>::retrieve_schema() };
    (@schema CreateView) => { <Self as $crate::views::CreateView>::create_schema() };
    (@schema UpdateView) => { <Self as $crate::views::UpdateView>::update_schema() };
    (@schema PartialUpdateView) => {
        <Self as $crate::views::PartialUpdateView>::partial_update_schema()
    };
    (@schema DestroyView) => { <Self as $crate::views::DestroyView>::destroy_schema() };

    (@route ListView) => { <Self as $crate::views::ListView>::list_route };
    (@route RetrieveView) => { <Self as $crate::views::RetrieveView>::retrieve_route };
    (@route CreateView) => { <Self as $crate::views::CreateView>::create_route };
    (@route UpdateView) => { <Self as $crate::views::UpdateView>::update_route };
    (@route PartialUpdateView) => {
        <Self as $crate::views::PartialUpdateView>::partial_update_route
    };
    (@route DestroyView) => { <Self as $crate::views::DestroyView>::destroy_route };

    ($viewset:ty => [$($view:ident),+ $(,)?]) => {
        impl $crate::views::ViewSet for $viewset {
            fn schema_config(&self) -> $crate::schema::SchemaConfig {
                $crate::schema::SchemaConfig::new()
                    $(.with($crate::viewset!(@operation $view), $crate::viewset!(@schema $view)))+
            }

            fn view_handler<S>(
                self: ::std::sync::Arc<Self>,
                operation: $crate::schema::Operation,
            ) -> ::std::option::Option<$crate::views::MethodRouter<S>>
            where
                S: ::std::clone::Clone + ::std::marker::Send + ::std::marker::Sync + 'static,
            {
                $(
                    if operation == $crate::viewset!(@operation $view) {
                        let route = $crate::viewset!(@route $view);
                        return ::std::option::Option::Some(route(self));
                    }
                )+
                ::std::option::Option::None
            }
        }
    };
}
