//! Permission guard middleware for the drinks server.
//! This middleware can be placed on any route or service.
//!
//! It extracts the bearer token from the `Authorization` header, verifies it against the identity provider's signing
//! keys and then checks that the token's `permissions` claim contains the permission the route requires. If every
//! step passes, the verified [`ClaimSet`] is stored in the request extensions and the request continues. Otherwise the
//! specific [`AuthError`] is returned to the caller as a JSON error response.

use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::*;

use crate::{
    auth::{authorize, ClaimSet, TokenVerifier},
    errors::{AuthError, ServerError},
};

pub struct PermissionGuardFactory {
    required_permission: String,
}

impl PermissionGuardFactory {
    pub fn new(required_permission: &str) -> Self {
        PermissionGuardFactory { required_permission: required_permission.to_string() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for PermissionGuardFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = PermissionGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(PermissionGuardService {
            required_permission: Rc::new(self.required_permission.clone()),
            service: Rc::new(service),
        })
    }
}

pub struct PermissionGuardService<S> {
    required_permission: Rc<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for PermissionGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = Rc::clone(&self.required_permission);
        Box::pin(async move {
            let Some(verifier) = req.app_data::<web::Data<TokenVerifier>>().cloned() else {
                error!("🔐️ No token verifier has been registered. Denying access to {}", req.path());
                let err = ServerError::ConfigurationError("Token verification is not configured".into());
                return Ok(req.error_response(err).map_into_right_body());
            };
            match authorize(req.request(), &verifier, &required).await {
                Ok(claims) => {
                    debug!("🔐️ {} granted '{required}' on {}", claims.subject().unwrap_or("<no subject>"), req.path());
                    req.extensions_mut().insert::<ClaimSet>(claims);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(e) => {
                    log_denial(&e, &required);
                    Ok(req.error_response(ServerError::from(e)).map_into_right_body())
                },
            }
        })
    }
}

fn log_denial(e: &AuthError, required: &str) {
    match e {
        AuthError::KeyNotFound(detail) | AuthError::InvalidToken(detail) | AuthError::InvalidClaims(detail) => {
            debug!("🔐️ Access requiring '{required}' denied. {e} ({detail})")
        },
        AuthError::KeySetUnavailable(detail) => warn!("🔐️ Access requiring '{required}' denied. {e} ({detail})"),
        _ => debug!("🔐️ Access requiring '{required}' denied. {e}"),
    }
}
