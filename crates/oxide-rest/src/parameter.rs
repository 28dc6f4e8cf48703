//! Documentation parameters attached to services and routes.

use serde::Serialize;

/// Where a parameter is carried in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// A named segment of the path template.
    Path,
    /// A query string value.
    Query,
    /// The request body.
    Body,
    /// A request header.
    Header,
    /// A form field.
    Form,
}

/// Describes one request parameter for documentation.
///
/// Parameters do not influence matching, with one exception: a
/// [`ParameterKind::Path`] parameter must name a segment of the template it
/// is attached to, which registration verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Where the parameter is carried.
    pub kind: ParameterKind,
    /// Whether clients must supply it.
    pub required: bool,
    /// Documented data type, e.g. `integer` or `string`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Value assumed when the parameter is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Whether the parameter may repeat.
    pub allow_multiple: bool,
    /// Closed set of accepted values, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowable_values: Vec<String>,
}

impl Parameter {
    /// Creates a parameter of the given kind.
    ///
    /// Path and body parameters start out required, the others optional.
    pub fn new(
        kind: ParameterKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: matches!(kind, ParameterKind::Path | ParameterKind::Body),
            data_type: None,
            default_value: None,
            allow_multiple: false,
            allowable_values: Vec::new(),
        }
    }

    /// Sets whether the parameter is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the documented data type.
    #[must_use]
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets whether the parameter may repeat.
    #[must_use]
    pub const fn allow_multiple(mut self, multiple: bool) -> Self {
        self.allow_multiple = multiple;
        self
    }

    /// Restricts the parameter to a closed set of values.
    #[must_use]
    pub fn allowable_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowable_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Returns whether this is a path parameter.
    #[must_use]
    pub fn is_path(&self) -> bool {
        self.kind == ParameterKind::Path
    }
}
