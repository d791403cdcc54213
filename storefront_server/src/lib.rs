//! # Storefront server
//! This crate hosts the HTTP server for the storefront checkout. It is responsible for:
//! * Accepting checkout requests from microsite buyers and registering online orders with the merchant's payment
//!   gateway, or committing cash-on-delivery orders.
//! * Verifying payment completions reported by the buyer's payment sheet.
//! * Receiving `payment.captured` webhooks from the gateway, so that payments still settle when the buyer's browser
//!   goes away before reporting back.
//! * Messaging merchants when an order is paid or a cash order comes in.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/store/{slug}/deliverability`: Whether the business delivers to an address.
//! * `/api/store/{slug}/checkout/online`: Create an online order and its gateway order.
//! * `/api/store/{slug}/checkout/complete`: Settle an online order with the payment sheet's signed result.
//! * `/api/store/{slug}/checkout/cash`: Commit a cash-on-delivery order.
//! * `/api/store/{slug}/order/{order_id}`: Look up an order.
//! * `/webhook/payment`: The gateway's payment webhook. Requests must carry a valid `X-Gateway-Signature`.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
