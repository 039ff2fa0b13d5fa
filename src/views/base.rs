//! One trait per CRUD operation.
//!
//! Each trait declares the typed payload/response of its operation and one
//! required extension point. The `*_route` and `*_schema` defaults turn the
//! extension point into an Axum handler and its schema entry; implementors
//! normally only write the extension point (or get it for free from
//! [`ModelViewSet`](super::ModelViewSet)).

use async_trait::async_trait;
use axum::Json;
use axum::extract::Path;
use axum::routing::{MethodRouter, delete, get, patch, post, put};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::schema::{Operation, OperationSchema, SchemaRef};
use crate::state::RequestState;

/// `GET {prefix}`
#[async_trait]
pub trait ListView: Send + Sync + 'static {
    type ListResponse: Serialize + ToSchema + Send + 'static;

    async fn get_objects(&self, state: &RequestState) -> Result<Vec<Self::ListResponse>, ApiError>;

    fn list_schema() -> OperationSchema {
        OperationSchema::response(SchemaRef::array_of::<Self::ListResponse>())
    }

    fn list_route<S>(self: Arc<Self>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        get(move |state: RequestState| async move { self.get_objects(&state).await.map(Json) })
    }
}

/// `GET {prefix}/{id}`
#[async_trait]
pub trait RetrieveView: Send + Sync + 'static {
    type RetrieveResponse: Serialize + ToSchema + Send + 'static;

    /// # Errors
    ///
    /// `ApiError::NotFound` when no object has this id.
    async fn get_object(&self, state: &RequestState, id: Uuid) -> Result<Self::RetrieveResponse, ApiError>;

    fn retrieve_schema() -> OperationSchema {
        OperationSchema::response(SchemaRef::of::<Self::RetrieveResponse>())
    }

    fn retrieve_route<S>(self: Arc<Self>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        get(move |state: RequestState, Path(id): Path<Uuid>| async move {
            self.get_object(&state, id).await.map(Json)
        })
    }
}

/// `POST {prefix}`, answers 201.
#[async_trait]
pub trait CreateView: Send + Sync + 'static {
    type CreatePayload: DeserializeOwned + ToSchema + Send + 'static;
    type CreateResponse: Serialize + ToSchema + Send + 'static;

    async fn create_object(
        &self,
        state: &RequestState,
        payload: Self::CreatePayload,
    ) -> Result<Self::CreateResponse, ApiError>;

    fn create_schema() -> OperationSchema {
        OperationSchema::payload_and_response(
            SchemaRef::of::<Self::CreatePayload>(),
            SchemaRef::of::<Self::CreateResponse>(),
        )
    }

    fn create_route<S>(self: Arc<Self>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        post(
            move |state: RequestState, Json(payload): Json<Self::CreatePayload>| async move {
                let created = self.create_object(&state, payload).await?;
                Ok::<_, ApiError>((Operation::Create.status_code(), Json(created)))
            },
        )
    }
}

/// `PUT {prefix}/{id}`
#[async_trait]
pub trait UpdateView: Send + Sync + 'static {
    type UpdatePayload: DeserializeOwned + ToSchema + Send + 'static;
    type UpdateResponse: Serialize + ToSchema + Send + 'static;

    async fn update_object(
        &self,
        state: &RequestState,
        id: Uuid,
        payload: Self::UpdatePayload,
    ) -> Result<Self::UpdateResponse, ApiError>;

    fn update_schema() -> OperationSchema {
        OperationSchema::payload_and_response(
            SchemaRef::of::<Self::UpdatePayload>(),
            SchemaRef::of::<Self::UpdateResponse>(),
        )
    }

    fn update_route<S>(self: Arc<Self>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        put(
            move |state: RequestState,
                  Path(id): Path<Uuid>,
                  Json(payload): Json<Self::UpdatePayload>| async move {
                self.update_object(&state, id, payload).await.map(Json)
            },
        )
    }
}

/// `PATCH {prefix}/{id}`; the payload carries only the fields to change.
#[async_trait]
pub trait PartialUpdateView: Send + Sync + 'static {
    type PartialUpdatePayload: DeserializeOwned + ToSchema + Send + 'static;
    type PartialUpdateResponse: Serialize + ToSchema + Send + 'static;

    async fn partial_update_object(
        &self,
        state: &RequestState,
        id: Uuid,
        payload: Self::PartialUpdatePayload,
    ) -> Result<Self::PartialUpdateResponse, ApiError>;

    fn partial_update_schema() -> OperationSchema {
        OperationSchema::payload_and_response(
            SchemaRef::of::<Self::PartialUpdatePayload>(),
            SchemaRef::of::<Self::PartialUpdateResponse>(),
        )
    }

    fn partial_update_route<S>(self: Arc<Self>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        patch(
            move |state: RequestState,
                  Path(id): Path<Uuid>,
                  Json(payload): Json<Self::PartialUpdatePayload>| async move {
                self.partial_update_object(&state, id, payload).await.map(Json)
            },
        )
    }
}

/// `DELETE {prefix}/{id}`, answers 204 with an empty body.
#[async_trait]
pub trait DestroyView: Send + Sync + 'static {
    async fn delete_object(&self, state: &RequestState, id: Uuid) -> Result<(), ApiError>;

    fn destroy_schema() -> OperationSchema {
        OperationSchema::empty()
    }

    fn destroy_route<S>(self: Arc<Self>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        delete(move |state: RequestState, Path(id): Path<Uuid>| async move {
            self.delete_object(&state, id)
                .await
                .map(|()| Operation::Destroy.status_code())
        })
    }
}
