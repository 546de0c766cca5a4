//! URI templates with named placeholders
//!
//! Templates like `greeting://{name}` are compiled once at registration time
//! into an anchored regex. Placeholders capture any span without `/`,
//! including the empty span, and the captured text is handed to resolvers
//! exactly as it appeared in the URI (no decoding).

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

pub type TemplateParams = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum UriTemplateError {
    #[error("unterminated '{{' in uri template")]
    UnterminatedPlaceholder,
    #[error("placeholder names must be non-empty and use [A-Za-z0-9_] only")]
    InvalidPlaceholderName,
    #[error("'}}' without a matching '{{' in uri template")]
    UnmatchedClose,
    #[error("duplicate placeholder name: {0}")]
    DuplicatePlaceholder(String),
    #[error("uri template produced an invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone)]
pub struct UriTemplate {
    raw: String,
    pattern: Regex,
    variables: Vec<String>,
}

impl UriTemplate {
    pub fn compile(template: &str) -> Result<Self, UriTemplateError> {
        let mut pattern = String::from("^");
        let mut variables: Vec<String> = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let literal = &rest[..open];
            if literal.contains('}') {
                return Err(UriTemplateError::UnmatchedClose);
            }
            pattern.push_str(&regex::escape(literal));

            let after_open = &rest[open + 1..];
            let close = after_open
                .find('}')
                .ok_or(UriTemplateError::UnterminatedPlaceholder)?;
            let name = &after_open[..close];
            if name.is_empty()
                || !name
                    .chars()
                    .all(|character| character.is_ascii_alphanumeric() || character == '_')
            {
                return Err(UriTemplateError::InvalidPlaceholderName);
            }
            if variables.iter().any(|existing| existing == name) {
                return Err(UriTemplateError::DuplicatePlaceholder(name.to_string()));
            }

            pattern.push_str(&format!("(?P<{name}>[^/]*)"));
            variables.push(name.to_string());
            rest = &after_open[close + 1..];
        }

        if rest.contains('}') {
            return Err(UriTemplateError::UnmatchedClose);
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        Ok(Self {
            raw: template.to_string(),
            pattern: Regex::new(&pattern)?,
            variables,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Returns the extracted placeholder values when `uri` matches the whole
    /// template, `None` otherwise.
    pub fn match_uri(&self, uri: &str) -> Option<TemplateParams> {
        let captures = self.pattern.captures(uri)?;

        let mut params = TemplateParams::new();
        for variable in &self.variables {
            let value = captures
                .name(variable)
                .map(|capture| capture.as_str().to_string())
                .unwrap_or_default();
            params.insert(variable.clone(), value);
        }

        Some(params)
    }
}
