//! User-administration calls
//!
//! Paths and bodies follow the backend's user API exactly: the collection
//! read lives under `/api/users`, the mutations under `/users/{username}`.

use crate::backend::client::BackendClient;
use crate::core::error::Result;
use crate::model::User;
use reqwest::Method;
use serde_json::json;

impl BackendClient {
    /// Fetch the whole user collection via GET /api/users
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        self.get_json("/api/users").await
    }

    /// Delete an account via DELETE /users/{username}
    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let path = format!("/users/{}", urlencoding::encode(username));
        self.write(Method::DELETE, &path, None).await
    }

    /// Flip the admin flag via PATCH /users/{username}/role
    pub async fn change_role(&self, username: &str, is_admin: bool) -> Result<()> {
        let path = format!("/users/{}/role", urlencoding::encode(username));
        self.write(Method::PATCH, &path, Some(json!({ "is_admin": is_admin })))
            .await
    }

    /// Forward a logout via POST /users/logout
    ///
    /// Any HTTP response counts as delivered; only a transport failure is an
    /// error. Non-success statuses are logged and otherwise ignored.
    pub async fn logout(&self) -> Result<()> {
        let response = self.dispatch(Method::POST, "/users/logout", None).await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                "Backend logout returned non-success"
            );
        }

        Ok(())
    }
}
