use actix_web::{
    Error, HttpMessage, ResponseError, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};

use crate::jwt::JwtService;
use crate::types::{AuthContext, AuthError};

fn bearer_token(req: &actix_web::HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Middleware that rejects requests without a valid bearer token and
/// attaches the verified [`AuthContext`] to the request.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: JwtService::new(),
        }))
    }
}

/// Service that implements the authentication middleware logic.
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "));

            let token = match token {
                Some(token) => token,
                None => {
                    let response = AuthError::MissingToken.error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let ctx = match jwt_service.auth_context_from_token(token) {
                Ok(ctx) => ctx,
                Err(_) => {
                    let response = AuthError::InvalidToken.error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(ctx);

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Extractor for the identity attached by [`AuthMiddleware`].
pub struct AuthenticatedUser(pub AuthContext);

impl actix_web::FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let ctx = req.extensions().get::<AuthContext>().cloned();

        ready(match ctx {
            Some(ctx) => Ok(AuthenticatedUser(ctx)),
            None => Err(AuthError::MissingToken.into()),
        })
    }
}

/// Extractor for routes that serve both guests and signed-in users, such
/// as booking creation. Resolves the bearer token when present, and to
/// `None` when the header is absent or does not verify.
pub struct MaybeUser(pub Option<AuthContext>);

impl actix_web::FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        // Routes using this extractor are not wrapped by AuthMiddleware,
        // so the token is verified here.
        let ctx = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .or_else(|| {
                bearer_token(req).and_then(|token| {
                    JwtService::new().auth_context_from_token(token).ok()
                })
            });

        ready(Ok(MaybeUser(ctx)))
    }
}

/// Extractor that additionally requires an operator role (admin or
/// employee). Must run behind [`AuthMiddleware`].
pub struct OperatorUser(pub AuthContext);

impl actix_web::FromRequest for OperatorUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let ctx = req.extensions().get::<AuthContext>().cloned();

        ready(match ctx {
            Some(ctx) if ctx.role.is_operator() => Ok(OperatorUser(ctx)),
            Some(_) => Err(AuthError::Forbidden.into()),
            None => Err(AuthError::MissingToken.into()),
        })
    }
}
