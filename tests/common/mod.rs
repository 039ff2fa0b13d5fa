#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::{Request, StatusCode, request::Parts};
use crudviews::{ApiError, MergeIntoActiveModel, RegisterOptions, RestRouter, db_dep_injector};
use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod todo {
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

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub owner: String,
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

/// List representation: a subset of `Todo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TodoSummary {
    pub id: Uuid,
    pub title: String,
}

impl From<todo::Model> for TodoSummary {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TodoCreate {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub owner: String,
}

impl From<TodoCreate> for todo::ActiveModel {
    fn from(create: TodoCreate) -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            title: Set(create.title),
            completed: Set(create.completed),
            owner: Set(create.owner),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TodoUpdate {
    pub title: String,
    pub completed: bool,
}

impl MergeIntoActiveModel<todo::ActiveModel> for TodoUpdate {
    fn merge_into_activemodel(self, mut existing: todo::ActiveModel) -> Result<todo::ActiveModel, DbErr> {
        existing.title = Set(self.title);
        existing.completed = Set(self.completed);
        Ok(existing)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
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

/// Implements `ModelViewSet` for the todo entity with default behaviour.
macro_rules! todo_model_viewset {
    ($name:ty) => {
        impl crudviews::ModelViewSet for $name {
            type Entity = $crate::common::todo::Entity;
            type Model = $crate::common::todo::Model;
            type ActiveModel = $crate::common::todo::ActiveModel;
            type ResponseModel = $crate::common::Todo;
            type ListModel = $crate::common::TodoSummary;
            type CreateModel = $crate::common::TodoCreate;
            type UpdateModel = $crate::common::TodoUpdate;
            type PartialUpdateModel = $crate::common::TodoPatch;

            const ID_COLUMN: $crate::common::todo::Column = $crate::common::todo::Column::Id;
            const RESOURCE_NAME: &'static str = "todo";
        }
    };
}
pub(crate) use todo_model_viewset;

/// Exposes every operation.
#[derive(Default)]
pub struct TodoViewSet;

todo_model_viewset!(TodoViewSet);

crudviews::viewset!(TodoViewSet => [
    ListView,
    RetrieveView,
    CreateView,
    UpdateView,
    PartialUpdateView,
    DestroyView,
]);

/// Exposes list, retrieve, create, update and destroy.
#[derive(Default)]
pub struct BasicTodoViewSet;

todo_model_viewset!(BasicTodoViewSet);

crudviews::viewset!(BasicTodoViewSet => [ListView, RetrieveView, CreateView, UpdateView, DestroyView]);

/// Reads the user name from the `x-user` header.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
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

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Every todo operation under `/api/v1/todos`.
pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let mut router: RestRouter = RestRouter::new();
    router.register_viewset::<TodoViewSet>(
        "/todos",
        RegisterOptions::new()
            .tag("todos")
            .dependency(db_dep_injector(db)),
    );
    Router::new().nest("/api/v1", router.into_router())
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    user: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateTodoTable)]
    }
}

pub struct CreateTodoTable;

impl MigrationName for CreateTodoTable {
    fn name(&self) -> &'static str {
        "m20250101_000001_create_todo_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateTodoTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Todos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Todos::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Todos::Title).string().not_null())
                    .col(
                        ColumnDef::new(Todos::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Todos::Owner).string().not_null().default(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Todos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Todos {
    Table,
    Id,
    Title,
    Completed,
    Owner,
}
