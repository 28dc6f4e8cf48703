//! Services: routes sharing a root path.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{ConfigError, Result};
use crate::filter::Filter;
use crate::parameter::{Parameter, ParameterKind};
use crate::path::PathTemplate;
use crate::route::{Route, RouteBuilder};

/// An ordered collection of routes under a common root path.
///
/// A service is assembled once at startup and then handed to a
/// [`crate::Router`], after which it is only read.
///
/// # Example
///
/// ```ignore
/// let mut users = Service::new();
/// users
///     .path("/users")?
///     .produces([mime::APPLICATION_JSON])
///     .consumes([mime::APPLICATION_JSON]);
/// users.route(users.get("/{id}").to(find_user))?;
/// users.route(users.post("").to(create_user))?;
/// ```
pub struct Service {
    root_path: String,
    root_template: PathTemplate,
    routes: Vec<Route>,
    produces: Vec<String>,
    consumes: Vec<String>,
    path_parameters: Vec<Parameter>,
    filters: Vec<Arc<dyn Filter>>,
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

impl Service {
    /// Creates a service rooted at `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root_path: "/".to_string(),
            root_template: PathTemplate::root(),
            routes: Vec::new(),
            produces: Vec::new(),
            consumes: Vec::new(),
            path_parameters: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Sets the root path template all routes are relative to.
    ///
    /// The root can only change while the service has no routes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RootAfterRoutes`] once a route was added and
    /// [`ConfigError::Template`] when `root` does not compile. The service
    /// keeps its previous root in both cases.
    pub fn path(&mut self, root: &str) -> Result<&mut Self> {
        if !self.routes.is_empty() {
            error!(
                root,
                current = %self.root_path,
                "service root changed after routes were added"
            );
            return Err(ConfigError::RootAfterRoutes {
                root: root.to_string(),
                current: self.root_path.clone(),
            });
        }
        let template = PathTemplate::compile(root).map_err(|err| {
            error!(root, %err, "invalid service root path");
            ConfigError::from(err)
        })?;
        self.root_path = root.to_string();
        self.root_template = template;
        Ok(self)
    }

    /// Returns the root path.
    #[must_use]
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Returns the compiled root path template.
    #[must_use]
    pub const fn root_template(&self) -> &PathTemplate {
        &self.root_template
    }

    /// Documents a parameter shared by all routes, typically one declared in
    /// the root path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPathParameter`] for a path parameter the
    /// root template does not declare.
    pub fn param(&mut self, parameter: Parameter) -> Result<&mut Self> {
        if parameter.is_path() && !self.root_template.has_param(&parameter.name) {
            return Err(ConfigError::UnknownPathParameter {
                name: parameter.name,
                path: self.root_path.clone(),
            });
        }
        self.path_parameters.push(parameter);
        Ok(self)
    }

    /// Creates a required path parameter for documentation.
    #[must_use]
    pub fn path_parameter(&self, name: &str, description: &str) -> Parameter {
        Parameter::new(ParameterKind::Path, name, description)
    }

    /// Creates an optional query parameter for documentation.
    #[must_use]
    pub fn query_parameter(&self, name: &str, description: &str) -> Parameter {
        Parameter::new(ParameterKind::Query, name, description)
    }

    /// Creates a required body parameter for documentation.
    #[must_use]
    pub fn body_parameter(&self, name: &str, description: &str) -> Parameter {
        Parameter::new(ParameterKind::Body, name, description)
    }

    /// Creates an optional header parameter for documentation.
    #[must_use]
    pub fn header_parameter(&self, name: &str, description: &str) -> Parameter {
        Parameter::new(ParameterKind::Header, name, description)
    }

    /// Creates an optional form parameter for documentation.
    #[must_use]
    pub fn form_parameter(&self, name: &str, description: &str) -> Parameter {
        Parameter::new(ParameterKind::Form, name, description)
    }

    /// Builds the route and appends it to the ordered list of routes.
    ///
    /// Media types the route did not declare are copied from the service
    /// defaults. The route is always placed under this service's root, even
    /// when the builder came from another service.
    ///
    /// # Errors
    ///
    /// Propagates [`RouteBuilder::build`] failures; nothing is registered
    /// then.
    pub fn route(&mut self, builder: RouteBuilder) -> Result<&mut Self> {
        let mut builder = builder.service_path(&self.root_path);
        builder.copy_defaults(&self.produces, &self.consumes);
        let route = builder.build().map_err(|err| {
            error!(root = %self.root_path, %err, "invalid route");
            err
        })?;
        debug!(method = route.method(), path = route.path(), "registered route");
        self.routes.push(route);
        Ok(self)
    }

    /// Creates a route builder for the given HTTP method.
    #[must_use]
    pub fn method(&self, method: &str) -> RouteBuilder {
        RouteBuilder::new()
            .service_path(&self.root_path)
            .method(method)
    }

    /// Shortcut for `.method("GET").path(sub_path)`.
    #[must_use]
    pub fn get(&self, sub_path: &str) -> RouteBuilder {
        self.method("GET").path(sub_path)
    }

    /// Shortcut for `.method("POST").path(sub_path)`.
    #[must_use]
    pub fn post(&self, sub_path: &str) -> RouteBuilder {
        self.method("POST").path(sub_path)
    }

    /// Shortcut for `.method("PUT").path(sub_path)`.
    #[must_use]
    pub fn put(&self, sub_path: &str) -> RouteBuilder {
        self.method("PUT").path(sub_path)
    }

    /// Shortcut for `.method("PATCH").path(sub_path)`.
    #[must_use]
    pub fn patch(&self, sub_path: &str) -> RouteBuilder {
        self.method("PATCH").path(sub_path)
    }

    /// Shortcut for `.method("DELETE").path(sub_path)`.
    #[must_use]
    pub fn delete(&self, sub_path: &str) -> RouteBuilder {
        self.method("DELETE").path(sub_path)
    }

    /// Shortcut for `.method("HEAD").path(sub_path)`.
    #[must_use]
    pub fn head(&self, sub_path: &str) -> RouteBuilder {
        self.method("HEAD").path(sub_path)
    }

    /// Shortcut for `.method("OPTIONS").path(sub_path)`.
    #[must_use]
    pub fn options(&self, sub_path: &str) -> RouteBuilder {
        self.method("OPTIONS").path(sub_path)
    }

    /// Sets the media types routes produce unless they declare their own.
    pub fn produces<I, S>(&mut self, media_types: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the media types routes consume unless they declare their own.
    pub fn consumes<I, S>(&mut self, media_types: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a filter applied to every route of this service.
    pub fn filter(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Shared path parameters.
    #[must_use]
    pub fn path_parameters(&self) -> &[Parameter] {
        &self.path_parameters
    }

    /// Service filters in registration order.
    #[must_use]
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// Default produced media types.
    #[must_use]
    pub fn produced(&self) -> &[String] {
        &self.produces
    }

    /// Default consumed media types.
    #[must_use]
    pub fn consumed(&self) -> &[String] {
        &self.consumes
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("root_path", &self.root_path)
            .field("routes", &self.routes)
            .field("produces", &self.produces)
            .field("consumes", &self.consumes)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}
