//! # oxide-rest
//!
//! Route registration and request dispatch for REST web services.
//!
//! This crate provides:
//! - Path templates with named, constrained and wildcard parameters
//! - Services grouping routes under a root path with shared defaults
//! - Fluent route builders with documentation metadata
//! - Dispatch that tells 404, 405, 415 and 406 apart
//! - Content negotiation on `Content-Type` and `Accept`
//! - Ordered, short-circuiting filter chains
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_rest::{mime, Request, Response, Router, Service};
//!
//! async fn find_user(req: Request) -> Response {
//!     let id = req.params.get("id").unwrap_or("unknown");
//!     Response::json(&serde_json::json!({"id": id}))
//! }
//!
//! let mut users = Service::new();
//! users
//!     .path("/users")?
//!     .produces([mime::APPLICATION_JSON])
//!     .consumes([mime::APPLICATION_JSON]);
//! users.route(users.get("/{id}").to(find_user))?;
//!
//! let mut router = Router::new();
//! router.add(users);
//!
//! let response = router.dispatch(Request::get("/users/42")).await;
//! ```
//!
//! ## Path Templates
//!
//! ```ignore
//! users.get("/{id}")                   // any non-empty segment
//! users.get("/{id:[0-9]+}")            // constrained segment
//! files.get("/{*path}")                // rest of the path, slashes included
//! ```
//!
//! Templates are compiled when the route is registered; a malformed one is
//! reported as a [`ConfigError`] right there rather than at request time.
//!
//! ## Resolution
//!
//! [`Router::resolve`] narrows routes by path, then method, then media
//! types, and reports which step failed:
//!
//! ```ignore
//! match router.resolve("DELETE", "/users/42", None, None) {
//!     Ok(resolved) => { /* resolved.route(), resolved.params() */ }
//!     Err(DispatchError::MethodNotAllowed { allowed, .. }) => { /* 405 */ }
//!     Err(other) => { /* other.status_code() */ }
//! }
//! ```
//!
//! When several routes qualify, the one registered first wins.
//!
//! ## Filters
//!
//! ```ignore
//! use oxide_rest::{FilterAction, FnFilter, LoggingFilter};
//!
//! router.filter(LoggingFilter);
//! users.filter(FnFilter::new("auth", |req, res| {
//!     if req.get_header("Authorization").is_some() {
//!         FilterAction::Continue
//!     } else {
//!         res.status = 401;
//!         FilterAction::Stop
//!     }
//! }));
//! ```
//!
//! Router filters run first, then service filters, then route filters, then
//! the handler.

mod error;
mod filter;
pub mod mime;
mod parameter;
mod path;
mod request;
mod response;
mod route;
mod router;
mod service;

pub use error::{ConfigError, DispatchError, Result, TemplateError};
pub use filter::{handler, Filter, FilterAction, FilterChain, FnFilter, Handler, LoggingFilter};
pub use futures::future::BoxFuture;
pub use parameter::{Parameter, ParameterKind};
pub use path::{join, tokenize, PathSegment, PathTemplate, WILDCARD_PARAM};
pub use request::{PathParams, Request};
pub use response::Response;
pub use route::{ResponseDoc, Route, RouteBuilder, RouteDoc};
pub use router::{Resolved, Router, RouterConfig};
pub use service::Service;
