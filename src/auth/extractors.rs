use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use super::context::{Principal, SecurityContext};
use crate::error::AppError;

/// Extracts the authenticated principal from the request's security context.
///
/// `AuthMiddleware` stores the context in request extensions after a bearer token
/// has been verified. Handlers on protected routes take this extractor instead of
/// reading extensions by hand. If no authenticated context is present the handler
/// is never invoked and the client receives `401 Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl CurrentPrincipal {
    pub fn into_inner(self) -> Principal {
        self.0
    }
}

impl FromRequest for CurrentPrincipal {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let principal = req
            .extensions()
            .get::<SecurityContext>()
            .and_then(SecurityContext::principal)
            .cloned();

        match principal {
            Some(principal) => ready(Ok(CurrentPrincipal(principal))),
            None => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
