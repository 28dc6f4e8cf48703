//! Request dispatch over registered services.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::DispatchError;
use crate::filter::{Filter, FilterChain};
use crate::mime;
use crate::path::tokenize;
use crate::request::{PathParams, Request};
use crate::response::Response;
use crate::route::Route;
use crate::service::Service;

/// Router settings.
///
/// Deserializable so it can live in an application's configuration file;
/// absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Treat `/users/` like `/users`.
    pub ignore_trailing_slash: bool,
    /// Skip services whose root path cannot prefix the request path.
    pub prefilter_by_root: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ignore_trailing_slash: true,
            prefilter_by_root: true,
        }
    }
}

/// A successfully resolved request.
#[derive(Debug)]
pub struct Resolved<'a> {
    service: &'a Service,
    route: &'a Route,
    params: PathParams,
}

impl<'a> Resolved<'a> {
    /// The service owning the route.
    #[must_use]
    pub const fn service(&self) -> &'a Service {
        self.service
    }

    /// The selected route.
    #[must_use]
    pub const fn route(&self) -> &'a Route {
        self.route
    }

    /// Path parameters extracted from the request path.
    #[must_use]
    pub const fn params(&self) -> &PathParams {
        &self.params
    }

    /// Consumes the resolution, returning route and parameters.
    #[must_use]
    pub fn into_parts(self) -> (&'a Route, PathParams) {
        (self.route, self.params)
    }
}

struct Candidate<'a> {
    service: &'a Service,
    route: &'a Route,
    params: PathParams,
}

/// Resolves requests against services and runs their filter chains.
///
/// Services are registered up front; after that the router is only read
/// and can be shared across threads without locking.
///
/// # Example
///
/// ```ignore
/// let mut users = Service::new();
/// users.path("/users")?;
/// users.route(users.get("/{id}").to(find_user))?;
///
/// let mut router = Router::new();
/// router.add(users);
///
/// let response = router.dispatch(Request::get("/users/42")).await;
/// ```
pub struct Router {
    config: RouterConfig,
    services: Vec<Service>,
    filters: Vec<Arc<dyn Filter>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty router with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Creates an empty router with the given settings.
    #[must_use]
    pub const fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            services: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Registers a service. Earlier services win ties.
    pub fn add(&mut self, service: Service) -> &mut Self {
        debug!(
            root = service.root_path(),
            routes = service.routes().len(),
            "registered service"
        );
        self.services.push(service);
        self
    }

    /// Adds a filter that runs before every service's filters.
    pub fn filter(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Registered services in registration order.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Resolves a request to exactly one route.
    ///
    /// Resolution narrows the candidates phase by phase: path, then method,
    /// then `Content-Type`, then `Accept`. The first phase that leaves no
    /// candidate decides the error. When several routes survive, the one
    /// registered first wins.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoMatchingRoute`] when no template matches `path`
    /// - [`DispatchError::MethodNotAllowed`] when templates match but none
    ///   with `method`
    /// - [`DispatchError::UnsupportedMediaType`] when no remaining route
    ///   consumes `content_type`
    /// - [`DispatchError::NotAcceptable`] when no remaining route produces
    ///   anything `accept` admits
    pub fn resolve(
        &self,
        method: &str,
        path: &str,
        content_type: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Resolved<'_>, DispatchError> {
        let parts = tokenize(path, self.config.ignore_trailing_slash);

        let path_matches = self.match_path(&parts);
        if path_matches.is_empty() {
            return Err(DispatchError::NoMatchingRoute {
                method: method.to_string(),
                path: path.to_string(),
            });
        }
        trace!(path, count = path_matches.len(), "path phase");

        let allowed = path_matches
            .iter()
            .map(|c| c.route.method().to_string())
            .collect();
        let mut candidates: Vec<_> = path_matches
            .into_iter()
            .filter(|c| c.route.method() == method)
            .collect();
        if candidates.is_empty() {
            return Err(DispatchError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
                allowed,
            });
        }
        trace!(method, count = candidates.len(), "method phase");

        if let Some(content_type) = content_type.filter(|v| !v.trim().is_empty()) {
            candidates.retain(|c| mime::consumes(c.route.consumes(), content_type));
            if candidates.is_empty() {
                return Err(DispatchError::UnsupportedMediaType {
                    content_type: content_type.to_string(),
                });
            }
        }

        if let Some(accept) = accept.filter(|v| !v.trim().is_empty()) {
            candidates.retain(|c| mime::produces(c.route.produces(), accept));
            if candidates.is_empty() {
                return Err(DispatchError::NotAcceptable {
                    accept: accept.to_string(),
                });
            }
        }

        if candidates.len() > 1 {
            trace!(
                count = candidates.len(),
                "several routes match, taking the first registered"
            );
        }

        let selected = candidates.swap_remove(0);
        Ok(Resolved {
            service: selected.service,
            route: selected.route,
            params: selected.params,
        })
    }

    /// Resolves a [`Request`] using its method, path and headers.
    ///
    /// # Errors
    ///
    /// See [`Router::resolve`].
    pub fn resolve_request(&self, request: &Request) -> Result<Resolved<'_>, DispatchError> {
        self.resolve(
            &request.method,
            &request.path,
            request.content_type(),
            request.accept(),
        )
    }

    /// Resolves the request, then runs router, service and route filters
    /// around the handler.
    ///
    /// Dispatch failures become responses: 404, 405 with an `Allow` header,
    /// 415 or 406. When the route produces a media type the client accepts,
    /// it is preset as the response `Content-Type`.
    pub fn dispatch<'a>(&'a self, mut request: Request) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let resolved = match self.resolve_request(&request) {
                Ok(resolved) => resolved,
                Err(err) => {
                    debug!(%err, "dispatch failed");
                    return Response::from_dispatch_error(&err);
                }
            };
            let (service, route) = (resolved.service(), resolved.route());
            request.params = resolved.params;

            let mut response = Response::ok();
            if let Some(media_type) = mime::preferred(route.produces(), request.accept()) {
                response.set_header("Content-Type", media_type);
            }

            let chain = FilterChain::layered(
                [&self.filters, service.filters(), route.own_filters()],
                route.handler(),
            );
            chain.next(&mut request, &mut response).await;
            response
        })
    }

    fn match_path<'a>(&'a self, parts: &[&str]) -> Vec<Candidate<'a>> {
        let mut matches = Vec::new();
        for service in &self.services {
            // Every route template starts with its service root.
            if self.config.prefilter_by_root && !service.root_template().matches_prefix(parts) {
                continue;
            }
            for route in service.routes() {
                if let Some(params) = route.template().match_segments(parts) {
                    matches.push(Candidate {
                        service,
                        route,
                        params,
                    });
                }
            }
        }
        matches
    }
}
