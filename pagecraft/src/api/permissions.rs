use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{Group, NewPermission, Permission, PrincipalRef};

impl ApiClient {
    /// `GET /templates/{id}/permissions/`
    pub async fn list_permissions(
        &self,
        template_id: &str,
        bearer: Option<&str>,
    ) -> Result<Vec<Permission>, ApiError> {
        let url = self.endpoint(&["templates", template_id, "permissions"], true)?;
        self.send_json(self.request(Method::GET, url, bearer)).await
    }

    /// `POST /templates/{id}/add_permission/`
    pub async fn add_permission(
        &self,
        template_id: &str,
        permission: &NewPermission,
        bearer: Option<&str>,
    ) -> Result<Permission, ApiError> {
        let url = self.endpoint(&["templates", template_id, "add_permission"], true)?;
        self.send_json(self.request(Method::POST, url, bearer).json(permission))
            .await
    }

    /// `DELETE /templates/{id}/remove_permission/{permissionId}/`
    pub async fn remove_permission(
        &self,
        template_id: &str,
        permission_id: &str,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(
            &["templates", template_id, "remove_permission", permission_id],
            true,
        )?;
        self.send_empty(self.request(Method::DELETE, url, bearer))
            .await
    }

    /// `GET /users/`, for choosing a grantee
    pub async fn list_users(&self, bearer: Option<&str>) -> Result<Vec<PrincipalRef>, ApiError> {
        let url = self.endpoint(&["users"], true)?;
        self.send_json(self.request(Method::GET, url, bearer)).await
    }

    /// `GET /groups/`, for choosing a grantee
    pub async fn list_groups(&self, bearer: Option<&str>) -> Result<Vec<Group>, ApiError> {
        let url = self.endpoint(&["groups"], true)?;
        self.send_json(self.request(Method::GET, url, bearer)).await
    }
}
