//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! gateway calls) must be expressed as futures or asynchronous functions.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    checkout_objects::{CheckoutRequest, PaymentCompletion},
    db_types::OrderId,
    CheckoutApi,
    Geocoder,
    PaymentGateway,
    ShippingAddress,
    StorefrontDatabase,
};

use crate::{
    config::ServerOptions,
    data_objects::{GatewayWebhook, JsonResponse},
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Deliverability  ----------------------------------------------------
route!(deliverability => Get "/store/{slug}/deliverability" impl StorefrontDatabase, PaymentGateway, Geocoder);
/// Whether the business delivers to the address given in the query string
/// (`?address=..&city=..&state=..&postal_code=..`).
pub async fn deliverability<B, G, Z>(
    path: web::Path<String>,
    address: web::Query<ShippingAddress>,
    api: web::Data<CheckoutApi<B, G, Z>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    let slug = path.into_inner();
    trace!("💻️ Deliverability check for {slug}");
    let result = api.check_deliverability(&slug, &address.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout_online => Post "/store/{slug}/checkout/online" impl StorefrontDatabase, PaymentGateway, Geocoder);
/// Creates an online order and registers it with the merchant's payment gateway.
///
/// The body is either a single product (`{"item": {..}, "customer": {..}}`) or a cart
/// (`{"items": [..], "customer": {..}}`). The response carries everything the client needs to open the payment sheet.
pub async fn checkout_online<B, G, Z>(
    path: web::Path<String>,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G, Z>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    let slug = path.into_inner();
    let CheckoutRequest { items, customer } = body.into_inner();
    debug!("💻️ Online checkout request for {slug}");
    let remote = api.create_remote_order(&slug, items.into_line_items(), customer).await?;
    Ok(HttpResponse::Ok().json(remote))
}

route!(checkout_complete => Post "/store/{slug}/checkout/complete" impl StorefrontDatabase, PaymentGateway, Geocoder);
pub async fn checkout_complete<B, G, Z>(
    path: web::Path<String>,
    body: web::Json<PaymentCompletion>,
    api: web::Data<CheckoutApi<B, G, Z>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    let slug = path.into_inner();
    let completion = body.into_inner();
    debug!("💻️ Payment completion for gateway order {} at {slug}", completion.gateway_order_id);
    let order = api.complete_order(&slug, completion).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(checkout_cash => Post "/store/{slug}/checkout/cash" impl StorefrontDatabase, PaymentGateway, Geocoder);
pub async fn checkout_cash<B, G, Z>(
    path: web::Path<String>,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G, Z>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    let slug = path.into_inner();
    let CheckoutRequest { items, customer } = body.into_inner();
    debug!("💻️ Cash checkout request for {slug}");
    let order = api.create_cash_order(&slug, items.into_line_items(), customer).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_by_id => Get "/store/{slug}/order/{order_id}" impl StorefrontDatabase, PaymentGateway, Geocoder);
pub async fn order_by_id<B, G, Z>(
    path: web::Path<(String, String)>,
    api: web::Data<CheckoutApi<B, G, Z>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    let (slug, order_id) = path.into_inner();
    trace!("💻️ Order lookup for {order_id} at {slug}");
    let order = api.fetch_order(&slug, &OrderId::from(order_id)).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(payment_webhook => Post "/payment" impl StorefrontDatabase, PaymentGateway, Geocoder);
/// Route handler for the payment gateway's webhook.
///
/// The body has already been authenticated by the HMAC middleware. Only `payment.captured` events are acted upon;
/// everything else is acknowledged and ignored so that the gateway does not keep retrying.
pub async fn payment_webhook<B, G, Z>(
    req: HttpRequest,
    body: web::Json<GatewayWebhook>,
    api: web::Data<CheckoutApi<B, G, Z>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
    Z: Geocoder,
{
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".into());
    let hook = body.into_inner();
    info!("💻️ Received {} webhook from {peer}", hook.event);
    let Some(payment) = hook.captured_payment() else {
        return Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Event {} ignored", hook.event))));
    };
    let Some(gateway_order_id) = payment.order_id.as_deref() else {
        debug!("💻️ Payment {} is not linked to an order. Ignoring it.", payment.id);
        return Ok(HttpResponse::Ok().json(JsonResponse::success("Payment is not linked to an order")));
    };
    let order = api.confirm_captured_payment(gateway_order_id, &payment.id, payment.amount).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {} is {}", order.order_id, order.status))))
}
