//! Axum extractors for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use crm_auth::CurrentUser;
use crm_services::Services;
use uuid::Uuid;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    /// Header the authentication proxy sets to the signed-in user's id
    pub user_header: Arc<str>,
}

impl AppState {
    pub fn new(services: Services, user_header: impl Into<Arc<str>>) -> Self {
        Self {
            services: Arc::new(services),
            user_header: user_header.into(),
        }
    }
}

/// The acting user, if the request carries one
///
/// A missing header yields `Actor(None)` and the service decides what an
/// anonymous caller may do. A header naming an unknown, deleted or
/// inactive account is rejected outright.
pub struct Actor(pub Option<CurrentUser>);

impl Actor {
    pub fn user(&self) -> Option<&CurrentUser> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Some(raw) = parts.headers.get(app_state.user_header.as_ref()) else {
            return Ok(Actor(None));
        };
        let id = raw
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| ApiError::unauthorized("Invalid user identifier"))?;

        match app_state.services.users.current_user(id).await? {
            Some(user) => Ok(Actor(Some(user))),
            None => {
                tracing::debug!(user_id = %id, "rejected unknown or inactive account");
                Err(ApiError::unauthorized("Unknown or inactive account"))
            }
        }
    }
}

/// Signed-in user extractor; rejects anonymous requests
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Actor::from_request_parts(parts, state).await? {
            Actor(Some(user)) => Ok(AuthenticatedUser(user)),
            Actor(None) => Err(ApiError::unauthorized("Authentication required")),
        }
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
