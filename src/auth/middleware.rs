use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use std::future::Future;
use std::pin::Pin;

use crate::auth::jwt;
use crate::error::ServiceError;
use crate::models::users::{self, CreateUserFromAuth};
use crate::state::AppState;

/// The caller behind a valid bearer token, provisioned on first sight.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let bearer = BearerAuth::extract(&req).await.map_err(|_| {
                ServiceError::Unauthorized("Authorization header must be: Bearer <token>".into())
            })?;

            let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
                ServiceError::Unauthorized("Authentication is not configured".into())
            })?;

            // 2. Validate the JWT.
            let claims = jwt::validate_token(bearer.token(), &state.jwt_secret)
                .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {e}")))?;

            // 3. Extract user info from claims.
            let user_id = claims.user_id().map_err(ServiceError::Unauthorized)?;
            let email = claims
                .user_email()
                .ok_or_else(|| ServiceError::Unauthorized("No email in token claims".into()))?;

            // 4. Find or create the user.
            let user = state
                .users
                .find_or_create_user(CreateUserFromAuth {
                    id: user_id,
                    email,
                    username: claims.username(),
                    display_name: claims.display_name(),
                    avatar_url: claims.avatar_url(),
                    role: claims.app_role(),
                    max_submissions_per_week: state.default_weekly_quota,
                })
                .await?;

            Ok(AuthenticatedUser(user))
        })
    }
}
