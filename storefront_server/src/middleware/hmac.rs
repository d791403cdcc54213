//! HMAC middleware for Actix Web.
//!
//! The payment gateway signs every webhook body with the webhook secret configured on its dashboard
//! (`SFB_GATEWAY_WEBHOOK_SECRET`). The hex-encoded HMAC-SHA256 of the raw body is sent in the `X-Gateway-Signature`
//! header.
//!
//! Wrap the webhook scope with this middleware so that handlers only ever see authenticated bodies.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorForbidden},
    web,
    Error,
};
use bytes::Bytes;
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use sfb_common::Secret;
use storefront_engine::helpers::verify_webhook_signature;

pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Gateway-Signature";

pub struct HmacMiddlewareFactory {
    hmac_header: String,
    key: Secret<String>,
    // If false, then the middleware will not check the HMAC signature and always allow the call
    enabled: bool,
}

impl HmacMiddlewareFactory {
    pub fn new(hmac_header: &str, key: Secret<String>, enabled: bool) -> Self {
        HmacMiddlewareFactory { hmac_header: hmac_header.into(), key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            hmac_header: self.hmac_header.clone(),
            key: self.key.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    hmac_header: String,
    key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.reveal().clone();
        let hmac_header = self.hmac_header.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking HMAC for request");
            if !enabled {
                trace!("🔐️ HMAC checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            if secret.is_empty() {
                warn!("🔐️ No webhook secret is configured. Denying access.");
                return Err(ErrorForbidden("Webhooks are not configured."));
            }
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ErrorBadRequest("Failed to extract request data.")
            })?;
            let signature = req
                .headers()
                .get(&hmac_header)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    warn!("🔐️ No HMAC signature found in request. Denying access.");
                    ErrorForbidden("No HMAC signature found.")
                })?
                .to_string();
            if verify_webhook_signature(&secret, data.as_ref(), &signature) {
                trace!("🔐️ HMAC check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid HMAC signature found in request. Denying access.");
                Err(ErrorForbidden("Invalid HMAC signature."))
            }
        })
    }
}

fn bytes_to_payload(buf: Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}

#[cfg(test)]
mod test {
    use actix_web::{body::MessageBody, http::StatusCode, test, web, App, HttpResponse};
    use storefront_engine::helpers::calculate_webhook_signature;

    use super::*;

    const SECRET: &str = "whsec_test";

    async fn echo(body: web::Bytes) -> HttpResponse {
        HttpResponse::Ok().body(body)
    }

    async fn call(enabled: bool, key: &str, signature: Option<&str>, body: &'static str) -> (StatusCode, String) {
        let app = test::init_service(
            App::new().service(
                web::resource("/hook")
                    .wrap(HmacMiddlewareFactory::new(WEBHOOK_SIGNATURE_HEADER, Secret::new(key.to_string()), enabled))
                    .route(web::post().to(echo)),
            ),
        )
        .await;
        let mut req = test::TestRequest::post().uri("/hook").set_payload(body);
        if let Some(sig) = signature {
            req = req.insert_header((WEBHOOK_SIGNATURE_HEADER, sig));
        }
        match test::try_call_service(&app, req.to_request()).await {
            Ok(res) => {
                let status = res.status();
                let body = res.into_body().try_into_bytes().unwrap();
                (status, String::from_utf8_lossy(&body).into_owned())
            },
            Err(e) => (e.as_response_error().status_code(), e.to_string()),
        }
    }

    #[actix_web::test]
    async fn valid_signature_passes_the_body_through() {
        let _ = env_logger::try_init();
        let body = r#"{"event":"payment.captured"}"#;
        let sig = calculate_webhook_signature(SECRET, body.as_bytes());
        let (status, echoed) = call(true, SECRET, Some(&sig), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(echoed, body);
    }

    #[actix_web::test]
    async fn missing_or_wrong_signatures_are_forbidden() {
        let _ = env_logger::try_init();
        let body = r#"{"event":"payment.captured"}"#;
        let (status, _) = call(true, SECRET, None, body).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let sig = calculate_webhook_signature("another secret", body.as_bytes());
        let (status, msg) = call(true, SECRET, Some(&sig), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(msg, "Invalid HMAC signature.");
    }

    #[actix_web::test]
    async fn an_unset_secret_rejects_everything() {
        let sig = calculate_webhook_signature("", b"{}");
        let (status, _) = call(true, "", Some(&sig), "{}").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn disabled_checks_allow_all() {
        let (status, echoed) = call(false, SECRET, None, "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(echoed, "{}");
    }
}
