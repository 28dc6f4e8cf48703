//! Path template compilation and matching.

use std::collections::HashSet;

use regex::Regex;

use crate::error::TemplateError;
use crate::request::PathParams;

/// Parameter name under which a bare `*` wildcard segment is captured.
pub const WILDCARD_PARAM: &str = "*";

/// A segment in a path template.
#[derive(Debug, Clone)]
pub enum PathSegment {
    /// A literal string segment.
    Literal(String),
    /// A parameter segment (e.g., `{id}` or `{id:[0-9]+}`).
    Param {
        /// Parameter name.
        name: String,
        /// Anchored inline constraint, if declared.
        constraint: Option<Regex>,
    },
    /// A wildcard segment (matches remainder of path).
    Wildcard(String),
}

impl PathSegment {
    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == value,
            Self::Param { constraint, .. } => {
                !value.is_empty() && constraint.as_ref().map_or(true, |re| re.is_match(value))
            }
            Self::Wildcard(_) => !value.is_empty(),
        }
    }
}

/// A compiled path template.
///
/// Template syntax:
/// - `/users` - Literal path
/// - `/users/{id}` - Path with parameter
/// - `/users/{id:[0-9]+}` - Parameter with an inline constraint
/// - `/files/{*path}` - Wildcard parameter (matches rest of path)
/// - `/files/*` - Wildcard captured under [`WILDCARD_PARAM`]
///
/// Leading and trailing slashes are not significant. Matching is
/// case-sensitive and compares segment by segment, so a template only
/// matches paths with the same number of segments unless it ends in a
/// wildcard.
///
/// # Example
///
/// ```
/// use oxide_rest::PathTemplate;
///
/// let template = PathTemplate::compile("/posts/{id}/comments/{comment_id}").unwrap();
/// let params = template.match_path("/posts/123/comments/456").unwrap();
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get("comment_id"), Some("456"));
/// ```
#[derive(Debug, Clone)]
pub struct PathTemplate {
    /// The original template string.
    template: String,
    /// Parsed segments.
    segments: Vec<PathSegment>,
    /// Parameter names in order.
    param_names: Vec<String>,
}

impl PathTemplate {
    /// Parses and compiles a path template.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when the template is empty, declares a
    /// parameter twice, mixes literal text and a parameter inside one
    /// segment, has unbalanced braces, carries an invalid constraint, or
    /// places a wildcard anywhere but last.
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        if template.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments: Vec<PathSegment> = Vec::new();
        let mut param_names = Vec::new();
        let mut seen = HashSet::new();

        for part in template.split('/').filter(|s| !s.is_empty()) {
            if matches!(segments.last(), Some(PathSegment::Wildcard(_))) {
                return Err(TemplateError::MisplacedWildcard {
                    template: template.to_string(),
                });
            }

            let segment = parse_segment(template, part)?;
            if let PathSegment::Param { name, .. } | PathSegment::Wildcard(name) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(TemplateError::DuplicateParameter {
                        template: template.to_string(),
                        name: name.clone(),
                    });
                }
                param_names.push(name.clone());
            }
            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
            param_names,
        })
    }

    /// Returns the template `/`, which only matches the root path.
    #[must_use]
    pub fn root() -> Self {
        Self {
            template: "/".to_string(),
            segments: Vec::new(),
            param_names: Vec::new(),
        }
    }

    /// Attempts to match a path against this template.
    ///
    /// A single trailing slash on the path is ignored. Returns extracted
    /// parameters if the path matches.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        self.match_segments(&tokenize(path, true))
    }

    /// Matches already tokenized path segments (see [`tokenize`]).
    #[must_use]
    pub fn match_segments(&self, parts: &[&str]) -> Option<PathParams> {
        let mut params = PathParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            if let PathSegment::Wildcard(name) = segment {
                let rest = parts.get(i..)?.join("/");
                if !segment.matches(&rest) {
                    return None;
                }
                params.insert(name.clone(), rest);
                return Some(params);
            }

            let value = parts.get(i)?;
            if !segment.matches(value) {
                return None;
            }
            if let PathSegment::Param { name, .. } = segment {
                params.insert(name.clone(), *value);
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Returns whether this template can match the leading segments of a
    /// longer path.
    ///
    /// Used to skip whole services whose root cannot apply to a request.
    #[must_use]
    pub fn matches_prefix(&self, parts: &[&str]) -> bool {
        for (i, segment) in self.segments.iter().enumerate() {
            if matches!(segment, PathSegment::Wildcard(_)) {
                return i < parts.len();
            }
            match parts.get(i) {
                Some(value) if segment.matches(value) => {}
                _ => return false,
            }
        }
        true
    }

    /// Returns the original template string.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the parameter names.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns whether the template declares a parameter with this name.
    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.param_names.iter().any(|n| n == name)
    }


    /// Returns whether the template ends in a wildcard.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::Wildcard(_)))
    }
}

/// Splits a request path into segments.
///
/// The leading slash is dropped. With `ignore_trailing_slash`, so is a
/// trailing one; otherwise it yields a final empty segment that only a
/// wildcard can absorb.
#[must_use]
pub fn tokenize(path: &str, ignore_trailing_slash: bool) -> Vec<&str> {
    let mut trimmed = path.strip_prefix('/').unwrap_or(path);
    if ignore_trailing_slash {
        trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    }
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

/// Joins a service root and a route sub-path into one template.
#[must_use]
pub fn join(root: &str, sub_path: &str) -> String {
    let root = root.trim_end_matches('/');
    let sub_path = sub_path.trim_start_matches('/');
    match (root.is_empty(), sub_path.is_empty()) {
        (true, true) => "/".to_string(),
        (_, true) => root.to_string(),
        _ => format!("{root}/{sub_path}"),
    }
}

fn parse_segment(template: &str, part: &str) -> Result<PathSegment, TemplateError> {
    if part == "*" {
        return Ok(PathSegment::Wildcard(WILDCARD_PARAM.to_string()));
    }

    let opens = part.starts_with('{');
    let closes = part.ends_with('}');

    if !(opens && closes) {
        let has_open = part.contains('{');
        let has_close = part.contains('}');
        return match (has_open, has_close) {
            (false, false) => Ok(PathSegment::Literal(part.to_string())),
            (true, true) => Err(TemplateError::MixedSegment {
                template: template.to_string(),
                segment: part.to_string(),
            }),
            _ => Err(TemplateError::UnbalancedBraces {
                template: template.to_string(),
                segment: part.to_string(),
            }),
        };
    }

    let inner = &part[1..part.len() - 1];
    let (name, constraint) = match inner.split_once(':') {
        Some((name, constraint)) => (name, Some(constraint)),
        None => (inner, None),
    };

    if let Some(name) = name.strip_prefix('*') {
        let name = if name.is_empty() { WILDCARD_PARAM } else { name };
        check_name(template, name, true)?;
        return Ok(PathSegment::Wildcard(name.to_string()));
    }

    check_name(template, name, false)?;

    match constraint {
        None => Ok(PathSegment::Param {
            name: name.to_string(),
            constraint: None,
        }),
        Some("*") => Ok(PathSegment::Wildcard(name.to_string())),
        Some(pattern) => {
            let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                TemplateError::InvalidConstraint {
                    template: template.to_string(),
                    name: name.to_string(),
                    source,
                }
            })?;
            Ok(PathSegment::Param {
                name: name.to_string(),
                constraint: Some(regex),
            })
        }
    }
}

fn check_name(template: &str, name: &str, wildcard: bool) -> Result<(), TemplateError> {
    if name.is_empty() {
        return Err(TemplateError::EmptyParameterName {
            template: template.to_string(),
        });
    }
    let valid = (wildcard && name == WILDCARD_PARAM)
        || name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidParameterName {
            template: template.to_string(),
            name: name.to_string(),
        })
    }
}
