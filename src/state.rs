//! Request-scoped state.
//!
//! Dependencies write into the request extensions before the handler runs;
//! handlers take a [`RequestState`] snapshot of those extensions and hand it to
//! the view extension points. Nothing here outlives the request.

use axum::extract::FromRequestParts;
use axum::http::{Extensions, request::Parts};
use sea_orm::DatabaseConnection;
use std::convert::Infallible;

use crate::errors::ApiError;

#[derive(Clone)]
struct DbSession(DatabaseConnection);

#[derive(Clone)]
struct AuthUser<U>(U);

/// Store the database session on a request's extensions, replacing any previous one.
pub fn set_db(extensions: &mut Extensions, db: DatabaseConnection) {
    extensions.insert(DbSession(db));
}

/// Store the authenticated user on a request's extensions, replacing any previous one.
pub fn set_user<U>(extensions: &mut Extensions, user: U)
where
    U: Clone + Send + Sync + 'static,
{
    extensions.insert(AuthUser(user));
}

#[derive(Clone, Debug, Default)]
pub struct RequestState {
    extensions: Extensions,
}

impl RequestState {
    #[must_use]
    pub fn from_extensions(extensions: &Extensions) -> Self {
        Self {
            extensions: extensions.clone(),
        }
    }

    /// The session injected by `db_dep_injector`.
    ///
    /// # Errors
    ///
    /// A missing session is a routing misconfiguration and yields a 500.
    pub fn db(&self) -> Result<&DatabaseConnection, ApiError> {
        self.extensions
            .get::<DbSession>()
            .map(|session| &session.0)
            .ok_or_else(|| {
                ApiError::internal(
                    "Database session unavailable",
                    Some("no session on request state; is db_dep_injector registered?".to_string()),
                )
            })
    }

    /// The user injected by `auth_dep_injector`, if any.
    #[must_use]
    pub fn user<U>(&self) -> Option<&U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.extensions.get::<AuthUser<U>>().map(|user| &user.0)
    }

    /// # Errors
    ///
    /// Returns 401 when no user of type `U` was injected.
    pub fn require_user<U>(&self) -> Result<&U, ApiError>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.user::<U>()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }

    /// Any other value a custom dependency placed on the request.
    #[must_use]
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.get::<T>()
    }
}

impl<S> FromRequestParts<S> for RequestState
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions))
    }
}
