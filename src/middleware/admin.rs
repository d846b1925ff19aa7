use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorUnauthorized},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::middleware::auth::Claims;

pub const ADMIN_ROLE: &str = "admin";

/// Gate on the role claim. Must sit inside `AuthMiddleware`, which is the
/// layer that validates the token and inserts the claims.
pub struct RequireAdmin;

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireAdminService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminService { service }))
    }
}

pub struct RequireAdminService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAdminService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();

        match claims {
            Some(claims) if claims.role == ADMIN_ROLE => Box::pin(self.service.call(req)),
            Some(claims) => {
                log::debug!("Rejected non-admin role: {}", claims.role);
                Box::pin(ready(Err(ErrorForbidden("Insufficient permissions"))))
            }
            None => Box::pin(ready(Err(ErrorUnauthorized("No authorization")))),
        }
    }
}
