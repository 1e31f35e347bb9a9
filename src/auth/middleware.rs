use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::Principal;
use crate::auth::token::TokenIssuer;
use crate::error::AppError;
use crate::store::Store;

/// Resolves the bearer token of every request it wraps.
///
/// A token only authenticates if its subject still exists in the store under the
/// same email. The resulting `Principal` is stored in the request extensions for
/// the extractor to pick up. Otherwise the request is answered with a 401 error
/// envelope and never reaches a handler.
pub struct AuthMiddleware;

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
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
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

        Box::pin(async move {
            let outcome = authenticate(&req).await;
            match outcome {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(app_err) => {
                    log::debug!("rejected request to {}: {}", req.path(), app_err);
                    let response = app_err.error_response().map_into_right_body();
                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response))
                }
            }
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<Principal, AppError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| AppError::InternalServerError("TokenIssuer is not registered".into()))?;
    let store = req
        .app_data::<web::Data<dyn Store>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("Store is not registered".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    let claims = issuer.verify(token)?;

    // Ids can be reused by a fresh store, so the email must still match.
    match store.find_user(claims.sub).await? {
        Some(user) if user.email == claims.email => Ok(Principal::from(user)),
        _ => {
            log::warn!("token subject {} <{}> no longer exists", claims.sub, claims.email);
            Err(AppError::Unauthorized("Invalid token".into()))
        }
    }
}
