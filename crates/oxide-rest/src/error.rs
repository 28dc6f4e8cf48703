//! Error types for registration and dispatch.

use std::collections::BTreeSet;

use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template string was empty.
    #[error("path template is empty")]
    Empty,

    /// A `{}` segment without a name.
    #[error("empty parameter name in template '{template}'")]
    EmptyParameterName {
        /// The offending template.
        template: String,
    },

    /// A parameter name containing characters outside `[A-Za-z0-9_.-]`.
    #[error("invalid parameter name '{name}' in template '{template}'")]
    InvalidParameterName {
        /// The offending template.
        template: String,
        /// The rejected name.
        name: String,
    },

    /// The same parameter name appears twice.
    #[error("parameter '{name}' declared more than once in template '{template}'")]
    DuplicateParameter {
        /// The offending template.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// A segment mixing literal text with a parameter, e.g. `user{id}`.
    #[error("segment '{segment}' mixes literal text and a parameter in template '{template}'")]
    MixedSegment {
        /// The offending template.
        template: String,
        /// The ambiguous segment.
        segment: String,
    },

    /// A `{` without its `}` (or the reverse).
    #[error("unbalanced braces in segment '{segment}' of template '{template}'")]
    UnbalancedBraces {
        /// The offending template.
        template: String,
        /// The malformed segment.
        segment: String,
    },

    /// An inline constraint that is not a valid pattern.
    #[error("invalid constraint for parameter '{name}' in template '{template}': {source}")]
    InvalidConstraint {
        /// The offending template.
        template: String,
        /// The constrained parameter.
        name: String,
        /// The pattern compilation error.
        source: regex::Error,
    },

    /// A wildcard segment that is not the last one.
    #[error("wildcard must be the last segment of template '{template}'")]
    MisplacedWildcard {
        /// The offending template.
        template: String,
    },
}

/// Registration-time configuration errors.
///
/// These abort registration of the offending service or route; nothing
/// partially built is left behind.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A root or route path failed to compile.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A route was built without an HTTP method.
    #[error("route '{path}' has no HTTP method")]
    EmptyMethod {
        /// Full path template of the route.
        path: String,
    },

    /// A route was built without a handler.
    #[error("route {method} {path} has no handler")]
    MissingHandler {
        /// HTTP method of the route.
        method: String,
        /// Full path template of the route.
        path: String,
    },

    /// The service root was changed after routes were registered under it.
    #[error("cannot move service root from '{current}' to '{root}' after routes were added")]
    RootAfterRoutes {
        /// The rejected root.
        root: String,
        /// The root the existing routes live under.
        current: String,
    },

    /// A path parameter documents a segment the template does not declare.
    #[error("path parameter '{name}' does not appear in template '{path}'")]
    UnknownPathParameter {
        /// Parameter name.
        name: String,
        /// Template that should have declared it.
        path: String,
    },
}

/// Result type alias for registration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Why a request could not be resolved to a route.
///
/// Each variant belongs to exactly one dispatch phase, so the caller can
/// answer with the matching status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No route template matches the request path.
    #[error("no route matches {method} {path}")]
    NoMatchingRoute {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// The path matched, but not with the request method.
    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
        /// Methods declared by the routes whose path matched.
        allowed: BTreeSet<String>,
    },

    /// No candidate route consumes the request content type.
    #[error("unsupported media type: {content_type}")]
    UnsupportedMediaType {
        /// The request `Content-Type`.
        content_type: String,
    },

    /// No candidate route produces anything the client accepts.
    #[error("not acceptable: {accept}")]
    NotAcceptable {
        /// The request `Accept` value.
        accept: String,
    },
}

impl DispatchError {
    /// Returns the HTTP status code the transport should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NoMatchingRoute { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::UnsupportedMediaType { .. } => 415,
            Self::NotAcceptable { .. } => 406,
        }
    }

    /// Returns the methods to list in an `Allow` header, if any.
    #[must_use]
    pub const fn allowed_methods(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::MethodNotAllowed { allowed, .. } => Some(allowed),
            _ => None,
        }
    }
}
