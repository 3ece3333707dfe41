/// Request authentication gate.
///
/// Extracts the access token cookie, verifies it, and resolves the
/// session snapshot from the Session Cache. On success the `SessionUser`
/// is inserted into request extensions for handlers to pick up with
/// `web::ReqData`. Verification is cache-only: this path never queries
/// the credential store, trading a small staleness window for latency.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{TokenIssuer, ACCESS_TOKEN_COOKIE};
use crate::error::{AppError, AuthError};
use crate::session::SessionStore;
use crate::users::SessionUser;

pub struct AuthGuard;

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let snapshot = authenticate(&req).await?;
            req.extensions_mut().insert(snapshot);
            service.call(req).await
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<SessionUser, Error> {
    let token = req
        .cookie(ACCESS_TOKEN_COOKIE)
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| AppError::Internal("token issuer not configured".to_string()))?;
    let sessions = req
        .app_data::<web::Data<SessionStore>>()
        .ok_or_else(|| AppError::Internal("session store not configured".to_string()))?;

    // An invalid or expired token is the client's signal to hit /refresh
    let claims = issuer.verify_access_token(token.value())?;
    let user_id = claims.user_id()?;

    let snapshot = sessions
        .get(user_id)
        .await?
        .ok_or(AppError::Auth(AuthError::SessionExpired))?;

    tracing::debug!(user_id = %user_id, "request authenticated");
    Ok(snapshot)
}
