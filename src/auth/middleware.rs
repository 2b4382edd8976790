use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::{Identity, TokenService};
use crate::error::AppError;
use crate::models::Role;

/// Authentication gate.
///
/// Extracts the bearer token from the `Authorization` header, verifies it
/// against the access secret, and attaches the resulting [`Identity`] to the
/// request's extensions for downstream middleware and handlers. A missing
/// header rejects with 401; a token that fails verification rejects with 403.
///
/// The [`TokenService`] is injected at construction so tests can wire scopes
/// with scenario-specific secrets.
pub struct AuthMiddleware {
    tokens: TokenService,
}

impl AuthMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match bearer {
            Some(token) => match self.tokens.verify_access_token(token) {
                Ok(claims) => {
                    let identity = Identity {
                        id: claims.sub,
                        role: claims.role,
                    };
                    req.extensions_mut().insert(identity);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(token_err) => {
                    let app_err: AppError = token_err.into();
                    Box::pin(async move { Err(app_err.into()) })
                }
            },
            None => {
                let app_err = AppError::Unauthorized("No token, authorization denied".into());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

/// Authorization gate, parameterized by the set of roles allowed through.
///
/// Expects `AuthMiddleware` to have attached an [`Identity`] earlier in the
/// chain. A request with no identity rejects with 401; an identity whose role
/// is not in the allowed set rejects with 403. Each route constructs its own
/// guard; instances share nothing.
pub struct RoleGuard {
    allowed: Rc<Vec<Role>>,
}

impl RoleGuard {
    pub fn allow(roles: &[Role]) -> Self {
        Self {
            allowed: Rc::new(roles.to_vec()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RoleGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardService {
            service,
            allowed: Rc::clone(&self.allowed),
        }))
    }
}

pub struct RoleGuardService<S> {
    service: S,
    allowed: Rc<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        let identity = req.extensions().get::<Identity>().copied();

        match identity {
            Some(identity) if self.allowed.contains(&identity.role) => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Some(_) => {
                let required = self
                    .allowed
                    .iter()
                    .map(Role::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let app_err = AppError::Forbidden(format!(
                    "Access denied. Requires one of the following roles: {}",
                    required
                ));
                Box::pin(async move { Err(app_err.into()) })
            }
            None => {
                let app_err = AppError::Unauthorized("Authentication required".into());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
