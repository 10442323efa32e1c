//! Client core for the Lingua translation backend.
//!
//! The backend wraps every reply in a `{code, msg, data}` envelope whose
//! `code` is a business status independent of the HTTP status. This crate
//! owns the request pipeline that speaks that protocol: credential
//! injection, envelope classification, single-flight token refresh with an
//! automatic retry, and duplicate-free user-facing error reporting.
//! Endpoint wrappers in [`services`] are thin parameter shapers on top of
//! [`http::ApiClient::send`].

pub mod auth;
pub mod config;
pub mod http;
pub mod services;
