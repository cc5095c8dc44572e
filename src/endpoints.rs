//! Endpoint registry for the records-store API.
//!
//! Templates are relative to the API root (`<base_url><api_prefix>`), which is
//! joined once when the registry is built. Placeholders use `{name}` syntax and
//! are filled positionally by [`EndpointRegistry::resolve`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template {template:?} is missing a value for {{{placeholder}}}")]
    MissingParameter {
        template: &'static str,
        placeholder: String,
    },

    #[error("template {template:?} takes {expected} parameter(s), got {got}")]
    UnexpectedParameters {
        template: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("template {template:?} has an unterminated placeholder")]
    Malformed { template: &'static str },
}

/// Logical endpoints exercised by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Token,
    Register,
    UserRights,
    Artists,
    Artist,
    Albums,
    Album,
}

impl Endpoint {
    pub const ALL: [Endpoint; 7] = [
        Endpoint::Token,
        Endpoint::Register,
        Endpoint::UserRights,
        Endpoint::Artists,
        Endpoint::Artist,
        Endpoint::Albums,
        Endpoint::Album,
    ];

    pub fn template(self) -> &'static str {
        match self {
            Endpoint::Token => "/auth/token",
            Endpoint::Register => "/auth/register",
            Endpoint::UserRights => "/auth/users/{username}/rights",
            Endpoint::Artists => "/artists/",
            Endpoint::Artist => "/artists/{id}",
            Endpoint::Albums => "/albums/",
            Endpoint::Album => "/albums/{id}",
        }
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn parse(template: &'static str) -> Result<Vec<Segment<'static>>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        let close = rest[open..]
            .find('}')
            .ok_or(TemplateError::Malformed { template })?;
        segments.push(Segment::Placeholder(&rest[open + 1..open + close]));
        rest = &rest[open + close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Ok(segments)
}

/// Resolves endpoints against a fixed API root.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    root: String,
}

impl EndpointRegistry {
    /// `base_url` loses any trailing slash; `api_prefix` gains a leading one.
    pub fn new(base_url: &str, api_prefix: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let prefix = api_prefix.trim_matches('/');
        let root = if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        };
        Self { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Path relative to the API root, with every placeholder substituted in order.
    ///
    /// Values are percent-encoded. Too few values is a [`TemplateError::MissingParameter`],
    /// too many is a [`TemplateError::UnexpectedParameters`].
    pub fn path(&self, endpoint: Endpoint, params: &[&str]) -> Result<String, TemplateError> {
        let template = endpoint.template();
        let segments = parse(template)?;
        let expected = segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Placeholder(_)))
            .count();
        if params.len() > expected {
            return Err(TemplateError::UnexpectedParameters {
                template,
                expected,
                got: params.len(),
            });
        }

        let mut values = params.iter();
        let mut path = String::with_capacity(template.len());
        for segment in segments {
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Placeholder(name) => {
                    let value = values.next().filter(|value| !value.is_empty()).ok_or_else(
                        || TemplateError::MissingParameter {
                            template,
                            placeholder: name.to_string(),
                        },
                    )?;
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }
        Ok(path)
    }

    /// Absolute URL for an endpoint.
    pub fn resolve(&self, endpoint: Endpoint, params: &[&str]) -> Result<String, TemplateError> {
        Ok(format!("{}{}", self.root, self.path(endpoint, params)?))
    }
}
