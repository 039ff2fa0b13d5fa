//! Todo API built from a composed viewset
//!
//! ```bash
//! cargo run --example todo_api
//! ```
//!
//! Then visit:
//! - **API**: <http://localhost:3000/todos>
//! - **OpenAPI**: <http://localhost:3000/openapi.json>
//!
//! Every request needs an `x-user` header; new todos belong to that user.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::get;
use axum::{Json, Router};
use crudviews::{
    ApiError, FromExtractor, MergeIntoActiveModel, ModelViewSet, RegisterOptions, RequestState,
    RestRouter, auth_dep_injector, db_dep_injector,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DbErr};
use serde::{Deserialize, Serialize};
use std::env;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::ToSchema;
use uuid::Uuid;

mod todo {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "todos")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub title: String,
        pub completed: bool,
        pub owner: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Serialize, ToSchema)]
struct Todo {
    id: Uuid,
    title: String,
    completed: bool,
    owner: String,
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            completed: model.completed,
            owner: model.owner,
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct TodoCreate {
    title: String,
}

impl From<TodoCreate> for todo::ActiveModel {
    fn from(create: TodoCreate) -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            title: Set(create.title),
            completed: Set(false),
            owner: Set(String::new()),
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct TodoUpdate {
    title: String,
    completed: bool,
}

impl MergeIntoActiveModel<todo::ActiveModel> for TodoUpdate {
    fn merge_into_activemodel(self, mut existing: todo::ActiveModel) -> Result<todo::ActiveModel, DbErr> {
        existing.title = Set(self.title);
        existing.completed = Set(self.completed);
        Ok(existing)
    }
}

#[derive(Deserialize, ToSchema)]
struct TodoPatch {
    title: Option<String>,
    completed: Option<bool>,
}

impl MergeIntoActiveModel<todo::ActiveModel> for TodoPatch {
    fn merge_into_activemodel(self, mut existing: todo::ActiveModel) -> Result<todo::ActiveModel, DbErr> {
        if let Some(title) = self.title {
            existing.title = Set(title);
        }
        if let Some(completed) = self.completed {
            existing.completed = Set(completed);
        }
        Ok(existing)
    }
}

#[derive(Clone)]
struct User(String);

impl<S: Send + Sync> FromRequestParts<S> for User {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user")
            .and_then(|value| value.to_str().ok())
            .map(|name| Self(name.to_string()))
            .ok_or_else(|| ApiError::unauthorized("Missing x-user header"))
    }
}

#[derive(Default)]
struct TodoViewSet;

#[async_trait]
impl ModelViewSet for TodoViewSet {
    type Entity = todo::Entity;
    type Model = todo::Model;
    type ActiveModel = todo::ActiveModel;
    type ResponseModel = Todo;
    type ListModel = Todo;
    type CreateModel = TodoCreate;
    type UpdateModel = TodoUpdate;
    type PartialUpdateModel = TodoPatch;

    const ID_COLUMN: todo::Column = todo::Column::Id;
    const RESOURCE_NAME: &'static str = "todo";

    async fn perform_create(&self, state: &RequestState, payload: TodoCreate) -> Result<Todo, ApiError> {
        let owner = state.require_user::<User>()?.0.clone();
        let mut active_model: todo::ActiveModel = payload.into();
        active_model.owner = Set(owner);
        Ok(Todo::from(active_model.insert(state.db()?).await?))
    }
}

crudviews::viewset!(TodoViewSet => [
    ListView,
    RetrieveView,
    CreateView,
    UpdateView,
    PartialUpdateView,
    DestroyView,
]);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,crudviews=debug")),
        )
        .init();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = Database::connect(&database_url).await?;
    db.execute_unprepared(
        r"CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            completed BOOLEAN NOT NULL,
            owner TEXT NOT NULL
        );",
    )
    .await?;

    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<TodoViewSet>(
        "/todos",
        RegisterOptions::new()
            .tag("todos")
            .dependency(db_dep_injector(db))
            .dependency(auth_dep_injector(FromExtractor::<User>::new())),
    );
    let openapi = router.openapi("Todo API", env!("CARGO_PKG_VERSION"));

    let app = Router::new()
        .merge(router.into_router())
        .route("/openapi.json", get(move || async move { Json(openapi) }))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("API: http://0.0.0.0:3000/todos, OpenAPI: http://0.0.0.0:3000/openapi.json");
    axum::serve(listener, app).await?;
    Ok(())
}
