//! Routes and their builder.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::filter::{handler, Filter, Handler};
use crate::parameter::Parameter;
use crate::path::{self, PathTemplate};
use crate::request::Request;
use crate::response::Response;

/// A documented response of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDoc {
    /// HTTP status code.
    pub code: u16,
    /// What the status means for this route.
    pub message: String,
}

/// A single route: one HTTP method bound to one path template.
///
/// Routes are immutable; they are created by [`RouteBuilder::build`],
/// usually through [`crate::Service::route`].
///
/// A route keeps only its own filters. The chain a request runs through is
/// the router filters, then the owning service's filters, then these.
#[derive(Clone)]
pub struct Route {
    method: String,
    template: PathTemplate,
    produces: Vec<String>,
    consumes: Vec<String>,
    parameters: Vec<Parameter>,
    filters: Vec<Arc<dyn Filter>>,
    handler: Handler,
    doc: String,
    notes: String,
    operation: String,
    reads: Option<String>,
    writes: Option<String>,
    responses: Vec<ResponseDoc>,
}

impl Route {
    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Full path template (service root plus sub-path).
    #[must_use]
    pub fn path(&self) -> &str {
        self.template.template()
    }

    /// Compiled path template.
    #[must_use]
    pub const fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Media types this route produces.
    #[must_use]
    pub fn produces(&self) -> &[String] {
        &self.produces
    }

    /// Media types this route consumes.
    #[must_use]
    pub fn consumes(&self) -> &[String] {
        &self.consumes
    }

    /// Documented parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Filters registered on this route alone, excluding service and router
    /// filters.
    #[must_use]
    pub fn own_filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// The handler.
    #[must_use]
    pub const fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Short documentation.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Longer notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Operation name, e.g. `findUser`.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Documented responses.
    #[must_use]
    pub fn responses(&self) -> &[ResponseDoc] {
        &self.responses
    }

    /// Returns a serializable snapshot for documentation generators.
    #[must_use]
    pub fn doc_view(&self) -> RouteDoc<'_> {
        RouteDoc {
            method: &self.method,
            path: self.path(),
            produces: &self.produces,
            consumes: &self.consumes,
            parameters: &self.parameters,
            doc: &self.doc,
            notes: &self.notes,
            operation: &self.operation,
            reads: self.reads.as_deref(),
            writes: self.writes.as_deref(),
            responses: &self.responses,
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path())
            .field("produces", &self.produces)
            .field("consumes", &self.consumes)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

/// Read-only documentation view of a [`Route`].
#[derive(Debug, Serialize)]
pub struct RouteDoc<'a> {
    /// HTTP method.
    pub method: &'a str,
    /// Full path template.
    pub path: &'a str,
    /// Produced media types.
    pub produces: &'a [String],
    /// Consumed media types.
    pub consumes: &'a [String],
    /// Documented parameters.
    pub parameters: &'a [Parameter],
    /// Short documentation.
    pub doc: &'a str,
    /// Longer notes.
    pub notes: &'a str,
    /// Operation name.
    pub operation: &'a str,
    /// Name of the request body type.
    pub reads: Option<&'a str>,
    /// Name of the response body type.
    pub writes: Option<&'a str>,
    /// Documented responses.
    pub responses: &'a [ResponseDoc],
}

/// Fluent, mutable construction of a [`Route`].
///
/// # Example
///
/// ```ignore
/// let mut users = Service::new();
/// users.path("/users")?;
/// users.route(
///     users
///         .get("/{id}")
///         .to(find_user)
///         .produces([mime::APPLICATION_JSON])
///         .doc("get a user"),
/// )?;
/// ```
#[derive(Default)]
pub struct RouteBuilder {
    root_path: String,
    sub_path: String,
    method: String,
    produces: Vec<String>,
    consumes: Vec<String>,
    parameters: Vec<Parameter>,
    filters: Vec<Arc<dyn Filter>>,
    handler: Option<Handler>,
    doc: String,
    notes: String,
    operation: String,
    reads: Option<String>,
    writes: Option<String>,
    responses: Vec<ResponseDoc>,
}

impl RouteBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root path the sub-path is relative to.
    #[must_use]
    pub(crate) fn service_path(mut self, root: &str) -> Self {
        self.root_path = root.to_string();
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Sets the path relative to the service root.
    #[must_use]
    pub fn path(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = sub_path.into();
        self
    }

    /// Binds an async handler function.
    #[must_use]
    pub fn to<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.to_handler(handler(f))
    }

    /// Binds an already boxed handler.
    #[must_use]
    pub fn to_handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the produced media types, overriding the service defaults.
    #[must_use]
    pub fn produces<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the consumed media types, overriding the service defaults.
    #[must_use]
    pub fn consumes<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Documents a parameter.
    #[must_use]
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds a route-specific filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Sets the short documentation.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Sets the longer notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Names the request body type.
    #[must_use]
    pub fn reads(mut self, type_name: impl Into<String>) -> Self {
        self.reads = Some(type_name.into());
        self
    }

    /// Names the response body type.
    #[must_use]
    pub fn writes(mut self, type_name: impl Into<String>) -> Self {
        self.writes = Some(type_name.into());
        self
    }

    /// Documents a possible response.
    #[must_use]
    pub fn returns(mut self, code: u16, message: impl Into<String>) -> Self {
        self.responses.push(ResponseDoc {
            code,
            message: message.into(),
        });
        self
    }

    /// Returns the full path template this builder will register.
    #[must_use]
    pub fn full_path(&self) -> String {
        path::join(&self.root_path, &self.sub_path)
    }

    /// Fills in media types the route did not declare itself.
    pub(crate) fn copy_defaults(&mut self, produces: &[String], consumes: &[String]) {
        if self.produces.is_empty() {
            self.produces = produces.to_vec();
        }
        if self.consumes.is_empty() {
            self.consumes = consumes.to_vec();
        }
    }

    /// Finalizes the route.
    ///
    /// # Errors
    ///
    /// Fails when the method is empty, the full path does not compile, no
    /// handler was bound, or a path parameter names no template segment.
    pub fn build(self) -> Result<Route> {
        let full_path = self.full_path();
        if self.method.is_empty() {
            return Err(ConfigError::EmptyMethod { path: full_path });
        }

        let template = PathTemplate::compile(&full_path)?;

        let Some(handler) = self.handler else {
            return Err(ConfigError::MissingHandler {
                method: self.method,
                path: full_path,
            });
        };

        if let Some(unknown) = self
            .parameters
            .iter()
            .find(|p| p.is_path() && !template.has_param(&p.name))
        {
            return Err(ConfigError::UnknownPathParameter {
                name: unknown.name.clone(),
                path: full_path,
            });
        }

        Ok(Route {
            method: self.method,
            template,
            produces: self.produces,
            consumes: self.consumes,
            parameters: self.parameters,
            filters: self.filters,
            handler,
            doc: self.doc,
            notes: self.notes,
            operation: self.operation,
            reads: self.reads,
            writes: self.writes,
            responses: self.responses,
        })
    }
}
