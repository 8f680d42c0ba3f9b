//! User profile lookups.

use crate::errors::ApiError;
use crate::models::UserNameResponse;
use crate::services::platform::run_typed;
use platform_client::GraphqlExecutor;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

const USER_NAME_QUERY: &str = r#"query get_user_name($userID: Int!) {
  user(where: {id: {_eq: $userID}}) {
    firstName
    lastName
  }
}"#;

#[derive(Debug, Deserialize)]
struct UserNameData {
    user: Vec<UserNameResponse>,
}

/// User lookups through the platform GraphQL engine.
#[derive(Clone)]
pub struct UserService {
    executor: Arc<dyn GraphqlExecutor>,
}

impl UserService {
    pub fn new(executor: Arc<dyn GraphqlExecutor>) -> Self {
        Self { executor }
    }

    /// First and last name of a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the platform has no such user.
    #[instrument(skip_all)]
    pub async fn name(&self, user_id: i64) -> Result<UserNameResponse, ApiError> {
        let data: UserNameData = run_typed(
            self.executor.as_ref(),
            "user_name",
            USER_NAME_QUERY,
            &json!({"userID": user_id}),
        )
        .await?;

        data.user
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}
