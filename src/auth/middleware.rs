use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use super::authenticator::{Outcome, RequestAuthenticator};
use super::context::SecurityContext;
use crate::error::AppError;

/// Authenticates every request before it reaches a handler.
///
/// Wrap the whole `App` with it. Public routes pass straight through; protected
/// routes either get a [`SecurityContext`] in their extensions or a 401.
#[derive(Clone)]
pub struct AuthMiddleware {
    authenticator: Arc<RequestAuthenticator>,
}

impl AuthMiddleware {
    pub fn new(authenticator: Arc<RequestAuthenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            authenticator: Arc::clone(&self.authenticator),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    authenticator: Arc<RequestAuthenticator>,
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
        let service = Rc::clone(&self.service);
        let authenticator = Arc::clone(&self.authenticator);

        Box::pin(async move {
            let path = req.path().to_owned();
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match authenticator.intercept(&path, authorization.as_deref()).await {
                Outcome::Bypassed => service.call(req).await.map(ServiceResponse::map_into_left_body),
                Outcome::Proceed(context) => {
                    if let Err(err) = authorize(&context) {
                        return Ok(req.into_response(err.error_response()).map_into_right_body());
                    }
                    req.extensions_mut().insert(context);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Outcome::Rejected(fault) => {
                    log::error!("authentication filter failed on {}: {}", path, fault);
                    let response = HttpResponse::Unauthorized()
                        .content_type(header::ContentType::plaintext())
                        .body("Unauthorized");
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// The protected-route boundary: only authenticated contexts pass.
///
/// Missing, malformed, expired and badly signed tokens all end here with the
/// same response.
pub fn authorize(context: &SecurityContext) -> Result<(), AppError> {
    if context.is_authenticated() {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Authentication required".into()))
    }
}
