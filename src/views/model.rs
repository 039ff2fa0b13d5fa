use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, FromQueryResult,
    IntoActiveModel, ModelTrait, QueryFilter, Select,
};
use serde::{Serialize, de::DeserializeOwned};
use utoipa::ToSchema;
use uuid::Uuid;

use super::base::{
    CreateView, DestroyView, ListView, PartialUpdateView, RetrieveView, UpdateView,
};
use crate::errors::ApiError;
use crate::state::RequestState;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Merge this payload into an existing active model, marking changed fields as set.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if a value cannot be converted.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// Sea-ORM backend for the view traits.
///
/// Implementing this trait gives a type every view trait; compose it with
/// `viewset!` to choose which operations are routed. All queries run on the
/// session the request state carries, so a `db_dep_injector` must be
/// registered for the routes.
///
/// Override points, from narrow to wide:
///
/// - `queryset`: the base `Select` every lookup starts from (scoping by user, soft deletes)
/// - `fetch_all` / `fetch_one`: read queries
/// - `perform_create` / `perform_update` / `perform_partial_update` / `perform_delete`: writes
///
/// ```rust,ignore
/// struct TodoViewSet;
///
/// impl ModelViewSet for TodoViewSet {
///     type Entity = todo::Entity;
///     type Model = todo::Model;
///     type ActiveModel = todo::ActiveModel;
///     type ResponseModel = Todo;
///     type ListModel = Todo;
///     type CreateModel = TodoCreate;
///     type UpdateModel = TodoUpdate;
///     type PartialUpdateModel = TodoPatch;
///
///     const ID_COLUMN: todo::Column = todo::Column::Id;
///     const RESOURCE_NAME: &'static str = "todo";
/// }
///
/// viewset!(TodoViewSet => [ListView, RetrieveView, CreateView, UpdateView, DestroyView]);
/// ```
#[async_trait]
pub trait ModelViewSet: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;

    type ResponseModel: From<Self::Model> + Serialize + ToSchema + Send + 'static;
    type ListModel: From<Self::Model> + Serialize + ToSchema + Send + 'static;
    type CreateModel: Into<Self::ActiveModel> + DeserializeOwned + ToSchema + Send + 'static;
    type UpdateModel: MergeIntoActiveModel<Self::ActiveModel> + DeserializeOwned + ToSchema + Send + 'static;
    type PartialUpdateModel: MergeIntoActiveModel<Self::ActiveModel>
        + DeserializeOwned
        + ToSchema
        + Send
        + 'static;

    const ID_COLUMN: <Self::Entity as EntityTrait>::Column;
    const RESOURCE_NAME: &'static str;

    fn queryset(&self, _state: &RequestState) -> Select<Self::Entity> {
        Self::Entity::find()
    }

    /// Look up one model inside `queryset`.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` when the id is absent or filtered out.
    async fn find_object(&self, state: &RequestState, id: Uuid) -> Result<Self::Model, ApiError> {
        let db = state.db()?;
        self.queryset(state)
            .filter(ColumnTrait::eq(&Self::ID_COLUMN, id))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found(Self::RESOURCE_NAME, Some(id.to_string())))
    }

    async fn fetch_all(&self, state: &RequestState) -> Result<Vec<Self::ListModel>, ApiError> {
        let db = state.db()?;
        let models = self.queryset(state).all(db).await?;
        Ok(models.into_iter().map(Self::ListModel::from).collect())
    }

    async fn fetch_one(&self, state: &RequestState, id: Uuid) -> Result<Self::ResponseModel, ApiError> {
        let model = self.find_object(state, id).await?;
        Ok(Self::ResponseModel::from(model))
    }

    async fn perform_create(
        &self,
        state: &RequestState,
        payload: Self::CreateModel,
    ) -> Result<Self::ResponseModel, ApiError> {
        let db = state.db()?;
        let active_model: Self::ActiveModel = payload.into();
        let model = active_model.insert(db).await?;
        tracing::debug!(resource = Self::RESOURCE_NAME, "Created object");
        Ok(Self::ResponseModel::from(model))
    }

    async fn perform_update(
        &self,
        state: &RequestState,
        id: Uuid,
        payload: Self::UpdateModel,
    ) -> Result<Self::ResponseModel, ApiError> {
        let existing: Self::ActiveModel = self.find_object(state, id).await?.into_active_model();
        let merged = payload.merge_into_activemodel(existing)?;
        let model = merged.update(state.db()?).await?;
        Ok(Self::ResponseModel::from(model))
    }

    async fn perform_partial_update(
        &self,
        state: &RequestState,
        id: Uuid,
        payload: Self::PartialUpdateModel,
    ) -> Result<Self::ResponseModel, ApiError> {
        let existing: Self::ActiveModel = self.find_object(state, id).await?.into_active_model();
        let merged = payload.merge_into_activemodel(existing)?;
        let model = merged.update(state.db()?).await?;
        Ok(Self::ResponseModel::from(model))
    }

    async fn perform_delete(&self, state: &RequestState, id: Uuid) -> Result<(), ApiError> {
        let existing: Self::ActiveModel = self.find_object(state, id).await?.into_active_model();
        existing.delete(state.db()?).await?;
        tracing::debug!(resource = Self::RESOURCE_NAME, %id, "Deleted object");
        Ok(())
    }
}

#[async_trait]
impl<T: ModelViewSet> ListView for T {
    type ListResponse = T::ListModel;

    async fn get_objects(&self, state: &RequestState) -> Result<Vec<T::ListModel>, ApiError> {
        self.fetch_all(state).await
    }
}

#[async_trait]
impl<T: ModelViewSet> RetrieveView for T {
    type RetrieveResponse = T::ResponseModel;

    async fn get_object(&self, state: &RequestState, id: Uuid) -> Result<T::ResponseModel, ApiError> {
        self.fetch_one(state, id).await
    }
}

#[async_trait]
impl<T: ModelViewSet> CreateView for T {
    type CreatePayload = T::CreateModel;
    type CreateResponse = T::ResponseModel;

    async fn create_object(
        &self,
        state: &RequestState,
        payload: T::CreateModel,
    ) -> Result<T::ResponseModel, ApiError> {
        self.perform_create(state, payload).await
    }
}

#[async_trait]
impl<T: ModelViewSet> UpdateView for T {
    type UpdatePayload = T::UpdateModel;
    type UpdateResponse = T::ResponseModel;

    async fn update_object(
        &self,
        state: &RequestState,
        id: Uuid,
        payload: T::UpdateModel,
    ) -> Result<T::ResponseModel, ApiError> {
        self.perform_update(state, id, payload).await
    }
}

#[async_trait]
impl<T: ModelViewSet> PartialUpdateView for T {
    type PartialUpdatePayload = T::PartialUpdateModel;
    type PartialUpdateResponse = T::ResponseModel;

    async fn partial_update_object(
        &self,
        state: &RequestState,
        id: Uuid,
        payload: T::PartialUpdateModel,
    ) -> Result<T::ResponseModel, ApiError> {
        self.perform_partial_update(state, id, payload).await
    }
}

#[async_trait]
impl<T: ModelViewSet> DestroyView for T {
    async fn delete_object(&self, state: &RequestState, id: Uuid) -> Result<(), ApiError> {
        self.perform_delete(state, id).await
    }
}
