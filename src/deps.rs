//! Dependencies run before a view handler.
//!
//! A [`Dependency`] receives the request parts and may write into the request
//! extensions or reject the request. [`db_dep_injector`] and
//! [`auth_dep_injector`] wrap an upstream provider and copy what it produces
//! onto the request state, where [`RequestState`](crate::state::RequestState)
//! picks it up.
//!
//! ```rust,ignore
//! let options = RegisterOptions::new()
//!     .dependency(db_dep_injector(db.clone()))
//!     .dependency(auth_dep_injector(FromExtractor::<CurrentUser>::new()));
//! ```

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sea_orm::DatabaseConnection;
use std::convert::Infallible;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::state;

#[async_trait]
pub trait Dependency: Send + Sync + 'static {
    /// Runs once per request before the handler.
    ///
    /// # Errors
    ///
    /// The returned response is sent as-is and the handler is skipped.
    async fn inject(&self, parts: &mut Parts) -> Result<(), Response>;
}

#[async_trait]
impl<D> Dependency for Arc<D>
where
    D: Dependency + ?Sized,
{
    async fn inject(&self, parts: &mut Parts) -> Result<(), Response> {
        (**self).inject(parts).await
    }
}

/// Produces the database session for a request.
#[async_trait]
pub trait SessionProvider: Send + Sync + 'static {
    type Rejection: IntoResponse + Send;

    async fn session(&self, parts: &mut Parts) -> Result<DatabaseConnection, Self::Rejection>;
}

/// A connection is a pool handle; every request gets a clone of it.
#[async_trait]
impl SessionProvider for DatabaseConnection {
    type Rejection = Infallible;

    async fn session(&self, _parts: &mut Parts) -> Result<DatabaseConnection, Self::Rejection> {
        Ok(self.clone())
    }
}

/// Produces the authenticated user for a request.
#[async_trait]
pub trait UserProvider: Send + Sync + 'static {
    type User: Clone + Send + Sync + 'static;
    type Rejection: IntoResponse + Send;

    async fn user(&self, parts: &mut Parts) -> Result<Self::User, Self::Rejection>;
}

/// Uses an Axum extractor as the user provider; its rejection is passed through.
pub struct FromExtractor<E>(PhantomData<fn() -> E>);

impl<E> FromExtractor<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for FromExtractor<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for FromExtractor<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E> UserProvider for FromExtractor<E>
where
    E: FromRequestParts<()> + Clone + Send + Sync + 'static,
    E::Rejection: Send,
{
    type User = E;
    type Rejection = E::Rejection;

    async fn user(&self, parts: &mut Parts) -> Result<E, E::Rejection> {
        E::from_request_parts(parts, &()).await
    }
}

pub struct SessionInjector<P> {
    provider: P,
}

pub struct AuthInjector<P> {
    provider: P,
}

/// Wrap a session provider into a dependency that stores the session on the request state.
pub fn db_dep_injector<P: SessionProvider>(provider: P) -> SessionInjector<P> {
    SessionInjector { provider }
}

/// Wrap a user provider into a dependency that stores the user on the request state.
pub fn auth_dep_injector<P: UserProvider>(provider: P) -> AuthInjector<P> {
    AuthInjector { provider }
}

#[async_trait]
impl<P: SessionProvider> Dependency for SessionInjector<P> {
    async fn inject(&self, parts: &mut Parts) -> Result<(), Response> {
        let db = self
            .provider
            .session(parts)
            .await
            .map_err(IntoResponse::into_response)?;
        state::set_db(&mut parts.extensions, db);
        tracing::debug!(path = %parts.uri.path(), "Injected database session");
        Ok(())
    }
}

#[async_trait]
impl<P: UserProvider> Dependency for AuthInjector<P> {
    async fn inject(&self, parts: &mut Parts) -> Result<(), Response> {
        let user = self
            .provider
            .user(parts)
            .await
            .map_err(IntoResponse::into_response)?;
        state::set_user(&mut parts.extensions, user);
        tracing::debug!(path = %parts.uri.path(), "Injected authenticated user");
        Ok(())
    }
}

pub(crate) type DependencyChain = Arc<[Arc<dyn Dependency>]>;

/// Middleware running a route's dependencies in order.
pub(crate) async fn run_dependencies(
    State(dependencies): State<DependencyChain>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    for dependency in dependencies.iter() {
        if let Err(rejection) = dependency.inject(&mut parts).await {
            return rejection;
        }
    }
    next.run(Request::from_parts(parts, body)).await
}
