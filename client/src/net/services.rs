//! Typed wrappers over the backend endpoints.
//!
//! `auth` and `users` cover the session flow; [`Resource`] is the generic
//! REST helper the survey, question, and answer screens build on.

#[cfg(test)]
#[path = "services_test.rs"]
mod services_test;

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api::{ApiClient, ApiRequest};
use super::error::ApiError;
use super::transport::{Method, Transport};
use super::types::Page;

/// `/auth/*` endpoints.
pub mod auth {
    use super::super::types::{LoginRequest, LoginResponse, RegisterRequest};
    use super::*;

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn login<T: Transport>(api: &ApiClient<T>, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        api.post("/auth/login", credentials).await
    }

    /// `POST /auth/register`. The response body is not interpreted.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn register<T: Transport>(
        api: &ApiClient<T>,
        user: &RegisterRequest,
    ) -> Result<serde_json::Value, ApiError> {
        api.post("/auth/register", user).await
    }

    /// `POST /auth/logout` with no body.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn logout<T: Transport>(api: &ApiClient<T>) -> Result<(), ApiError> {
        let _: serde_json::Value = api.send(ApiRequest::new(Method::Post, "/auth/logout")).await?;
        Ok(())
    }
}

/// `/users/*` endpoints.
pub mod users {
    use super::super::types::{UpdateProfileRequest, UserProfile};
    use super::*;

    /// `GET /users/me`.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn me<T: Transport>(api: &ApiClient<T>) -> Result<UserProfile, ApiError> {
        api.get("/users/me").await
    }

    /// `PUT /users/profile`.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn update_profile<T: Transport>(
        api: &ApiClient<T>,
        changes: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        api.put("/users/profile", changes).await
    }
}

/// CRUD helper for a REST collection at `/{endpoint}`.
#[derive(Clone, Debug)]
pub struct Resource<R> {
    endpoint: String,
    _marker: PhantomData<fn() -> R>,
}

impl<R: DeserializeOwned> Resource<R> {
    #[must_use]
    pub fn new(endpoint: &str) -> Self {
        Self { endpoint: endpoint.trim_matches('/').to_owned(), _marker: PhantomData }
    }

    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("/{}", self.endpoint)
    }

    /// Path of one item; the id is percent-encoded.
    #[must_use]
    pub fn item_path(&self, id: &str) -> String {
        format!("/{}/{}", self.endpoint, urlencoding::encode(id))
    }

    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn list<T: Transport>(&self, api: &ApiClient<T>) -> Result<Vec<R>, ApiError> {
        api.get(&self.collection_path()).await
    }

    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn get<T: Transport>(&self, api: &ApiClient<T>, id: &str) -> Result<R, ApiError> {
        api.get(&self.item_path(id)).await
    }

    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn create<T, B>(&self, api: &ApiClient<T>, body: &B) -> Result<R, ApiError>
    where
        T: Transport,
        B: Serialize + ?Sized,
    {
        api.post(&self.collection_path(), body).await
    }

    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn update<T, B>(&self, api: &ApiClient<T>, id: &str, body: &B) -> Result<R, ApiError>
    where
        T: Transport,
        B: Serialize + ?Sized,
    {
        api.put(&self.item_path(id), body).await
    }

    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn delete<T: Transport>(&self, api: &ApiClient<T>, id: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = api.delete(&self.item_path(id)).await?;
        Ok(())
    }

    /// `GET /{endpoint}/count`.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn count<T: Transport>(&self, api: &ApiClient<T>) -> Result<u64, ApiError> {
        api.get(&format!("/{}/count", self.endpoint)).await
    }

    /// `GET /{endpoint}?page=..&limit=..`. The listing is itself shaped like
    /// an envelope, so it is requested raw.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ApiError`].
    pub async fn page<T: Transport>(&self, api: &ApiClient<T>, page: u32, limit: u32) -> Result<Page<R>, ApiError> {
        let endpoint = format!("/{}?page={page}&limit={limit}", self.endpoint);
        api.send(ApiRequest::new(Method::Get, &endpoint).raw()).await
    }
}

/// Surveys at `/survey`.
#[must_use]
pub fn surveys<R: DeserializeOwned>() -> Resource<R> {
    Resource::new("survey")
}

/// Questions at `/questions`.
#[must_use]
pub fn questions<R: DeserializeOwned>() -> Resource<R> {
    Resource::new("questions")
}

/// Answers at `/answers`.
#[must_use]
pub fn answers<R: DeserializeOwned>() -> Resource<R> {
    Resource::new("answers")
}

/// User records at `/users`, for admin screens. The signed-in user's own
/// profile goes through [`users::me`].
#[must_use]
pub fn users<R: DeserializeOwned>() -> Resource<R> {
    Resource::new("users")
}

/// `GET /questions/category/{category_id}`.
///
/// # Errors
///
/// Propagates the client's [`ApiError`].
pub async fn questions_by_category<T, R>(api: &ApiClient<T>, category_id: u64) -> Result<Vec<R>, ApiError>
where
    T: Transport,
    R: DeserializeOwned,
{
    api.get(&format!("/questions/category/{category_id}")).await
}
