/// Role-based authorization gate.
///
/// A stateless predicate over the authenticated identity's role and the
/// route's allowed-role set. Must be mounted inside an `AuthGuard`-ed
/// scope: it reads the `SessionUser` the guard inserted and performs no
/// I/O of its own.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::error::{AppError, AuthError};
use crate::users::{Role, SessionUser};

pub struct RoleGuard {
    allowed: Rc<Vec<Role>>,
}

impl RoleGuard {
    pub fn new(allowed: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed: Rc::new(allowed.into()),
        }
    }

    pub fn admin() -> Self {
        Self::new([Role::Admin])
    }
}

/// The predicate itself, kept free of any actix machinery.
pub fn role_allowed(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RoleGuardService {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RoleGuardService<S> {
    service: Rc<S>,
    allowed: Rc<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        let role = req
            .extensions()
            .get::<SessionUser>()
            .map(|user| user.role);
        let allowed = self.allowed.clone();
        let service = self.service.clone();

        Box::pin(async move {
            match role {
                // No identity in extensions means the guard ran outside an
                // authenticated scope
                None => Err(AppError::Auth(AuthError::MissingToken).into()),
                Some(role) if !role_allowed(role, &allowed) => {
                    Err(AppError::Forbidden(role.to_string()).into())
                }
                Some(_) => service.call(req).await,
            }
        })
    }
}
