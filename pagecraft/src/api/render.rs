use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{RenderRequest, RenderResult};

impl ApiClient {
    /// `POST /render/generate`
    pub async fn generate(
        &self,
        request: &RenderRequest,
        bearer: Option<&str>,
    ) -> Result<RenderResult, ApiError> {
        let url = self.endpoint(&["render", "generate"], false)?;
        self.send_json(self.request(Method::POST, url, bearer).json(request))
            .await
    }
}
