mod common;

use axum::Router;
use axum::http::{Method, StatusCode};
use crudviews::{
    Dependency, FromExtractor, ListView, Operation, RegisterOptions, RestRouter, RetrieveView,
    SchemaConfig, ViewSet, auth_dep_injector, db_dep_injector, views::MethodRouter,
};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

use common::{BasicTodoViewSet, CurrentUser, TodoViewSet, send, setup_test_db, todo_model_viewset};

/// Lists and retrieves; retrieve additionally requires a user.
#[derive(Default)]
struct GuardedTodos;

todo_model_viewset!(GuardedTodos);

impl ViewSet for GuardedTodos {
    fn schema_config(&self) -> SchemaConfig {
        TodoViewSet
            .schema_config()
            .without(Operation::Destroy)
            .without(Operation::Update)
            .without(Operation::PartialUpdate)
    }

    fn view_handler<S>(self: Arc<Self>, operation: Operation) -> Option<MethodRouter<S>>
    where
        S: Clone + Send + Sync + 'static,
    {
        match operation {
            Operation::List => Some(self.list_route()),
            Operation::Retrieve => Some(self.retrieve_route()),
            // routed only if the schema config lists it
            Operation::Destroy => Some(crudviews::DestroyView::destroy_route(self)),
            _ => None,
        }
    }

    fn route_dependencies(&self, operation: Operation) -> Vec<Arc<dyn Dependency>> {
        if operation == Operation::Retrieve {
            vec![Arc::new(auth_dep_injector(FromExtractor::<CurrentUser>::new()))]
        } else {
            Vec::new()
        }
    }
}

fn method_paths(router: &RestRouter) -> BTreeSet<(String, String)> {
    router
        .routes()
        .iter()
        .map(|route| (route.method.to_string(), route.path.clone()))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> BTreeSet<(String, String)> {
    expected
        .iter()
        .map(|(method, path)| ((*method).to_string(), (*path).to_string()))
        .collect()
}

#[tokio::test]
async fn test_five_view_viewset_registers_five_routes() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<BasicTodoViewSet>(
        "/todos",
        RegisterOptions::new().dependency(db_dep_injector(db)),
    );

    assert_eq!(router.routes().len(), 5);
    assert_eq!(
        method_paths(&router),
        pairs(&[
            ("GET", "/todos"),
            ("POST", "/todos"),
            ("GET", "/todos/{id}"),
            ("PUT", "/todos/{id}"),
            ("DELETE", "/todos/{id}"),
        ])
    );
}

#[tokio::test]
async fn test_partial_update_adds_patch_route() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<TodoViewSet>("/todos", RegisterOptions::new().dependency(db_dep_injector(db)));

    assert_eq!(router.routes().len(), 6);
    let patch = router
        .routes()
        .iter()
        .find(|route| route.method == Method::PATCH)
        .expect("PATCH route registered");
    assert_eq!(patch.path, "/todos/{id}");
    assert_eq!(patch.endpoint_name, "partial_update");
    assert_eq!(patch.status_code, StatusCode::OK);
}

#[tokio::test]
async fn test_route_metadata_matches_operation_table() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<TodoViewSet>("/todos", RegisterOptions::new().dependency(db_dep_injector(db)));

    for route in router.routes() {
        let expected_status = match route.operation {
            Operation::Create => StatusCode::CREATED,
            Operation::Destroy => StatusCode::NO_CONTENT,
            _ => StatusCode::OK,
        };
        assert_eq!(route.status_code, expected_status, "{}", route.endpoint_name);
        assert_eq!(route.endpoint_name, route.operation.as_str());
        assert_eq!(route.prefix, "/todos");
    }
}

#[tokio::test]
async fn test_tags_and_dependencies_apply_to_every_route() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<TodoViewSet>(
        "/todos",
        RegisterOptions::new()
            .tags(["todos", "v1"])
            .dependency(db_dep_injector(db))
            .dependency(auth_dep_injector(FromExtractor::<CurrentUser>::new())),
    );

    for route in router.routes() {
        assert_eq!(route.tags, vec!["todos".to_string(), "v1".to_string()]);
        assert_eq!(route.dependency_count, 2, "{} lost a dependency", route.endpoint_name);
    }
}

#[tokio::test]
async fn test_registration_dependencies_guard_every_route() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<TodoViewSet>(
        "/todos",
        RegisterOptions::new()
            .dependency(auth_dep_injector(FromExtractor::<CurrentUser>::new()))
            .dependency(db_dep_injector(db)),
    );
    let app: Router = router.into_router();
    let id = uuid::Uuid::new_v4();

    let requests = [
        ("GET", "/todos".to_string(), None),
        ("POST", "/todos".to_string(), Some(json!({"title": "x"}))),
        ("GET", format!("/todos/{id}"), None),
        ("PUT", format!("/todos/{id}"), Some(json!({"title": "x", "completed": true}))),
        ("PATCH", format!("/todos/{id}"), Some(json!({"completed": true}))),
        ("DELETE", format!("/todos/{id}"), None),
    ];
    for (method, uri, body) in requests {
        let (status, _) = send(&app, method, &uri, body, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri} was not guarded");
    }
}

#[tokio::test]
async fn test_operation_outside_schema_config_is_not_routed() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register(GuardedTodos, "/todos", RegisterOptions::new().dependency(db_dep_injector(db)));

    // Create is configured but has no handler; Destroy has a handler but no schema
    assert_eq!(
        method_paths(&router),
        pairs(&[("GET", "/todos"), ("GET", "/todos/{id}")])
    );

    let app: Router = router.into_router();
    let id = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "DELETE", &format!("/todos/{id}"), None, Some("ada")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = send(&app, "POST", "/todos", Some(json!({"title": "x"})), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_route_dependencies_only_guard_their_operation() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register(GuardedTodos, "/todos", RegisterOptions::new().dependency(db_dep_injector(db)));

    let counts: Vec<(Operation, usize)> = router
        .routes()
        .iter()
        .map(|route| (route.operation, route.dependency_count))
        .collect();
    assert!(counts.contains(&(Operation::List, 1)));
    assert!(counts.contains(&(Operation::Retrieve, 2)));

    let app: Router = router.into_router();
    let (status, body) = send(&app, "GET", "/todos", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let id = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/todos/{id}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", &format!("/todos/{id}"), None, Some("ada")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_same_viewset_under_two_prefixes() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router
        .register_viewset::<TodoViewSet>("/todos", RegisterOptions::new().dependency(db_dep_injector(db.clone())))
        .register_viewset::<BasicTodoViewSet>("/archive/", RegisterOptions::new().dependency(db_dep_injector(db)));

    assert_eq!(router.routes().len(), 11);
    assert!(router.routes().iter().any(|route| route.path == "/archive/{id}"));
    assert!(router.routes().iter().any(|route| route.path == "/archive"));
}

#[tokio::test]
#[should_panic]
async fn test_registering_same_prefix_twice_panics() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router
        .register_viewset::<TodoViewSet>("/todos", RegisterOptions::new().dependency(db_dep_injector(db.clone())))
        .register_viewset::<TodoViewSet>("/todos", RegisterOptions::new().dependency(db_dep_injector(db)));
}

#[tokio::test]
async fn test_route_schemas_come_from_view_types() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<TodoViewSet>("/todos", RegisterOptions::new().dependency(db_dep_injector(db)));

    let names = |operation: Operation| {
        let route = router
            .routes()
            .iter()
            .find(|route| route.operation == operation)
            .expect("operation registered");
        (
            route.schema.payload.as_ref().map(|schema| schema.name().to_string()),
            route.schema.response.as_ref().map(|schema| (schema.name().to_string(), schema.is_array())),
        )
    };

    assert_eq!(names(Operation::List), (None, Some(("TodoSummary".to_string(), true))));
    assert_eq!(names(Operation::Retrieve), (None, Some(("Todo".to_string(), false))));
    assert_eq!(
        names(Operation::Create),
        (Some("TodoCreate".to_string()), Some(("Todo".to_string(), false)))
    );
    assert_eq!(
        names(Operation::PartialUpdate),
        (Some("TodoPatch".to_string()), Some(("Todo".to_string(), false)))
    );
    assert_eq!(names(Operation::Destroy), (None, None));
}
