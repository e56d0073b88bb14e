//! Path template expansion.
//!
//! # Responsibilities
//! - Substitute `{name}` placeholders from call-time path parameters
//! - Fail at binding time, before any network I/O, when a placeholder has no
//!   matching argument
//!
//! # Design Decisions
//! - Named placeholders only; this is deliberately not a template engine

use std::collections::HashMap;

use crate::error::BindingError;

/// Expand every `{name}` placeholder in `template` from `params`.
pub fn expand(template: &str, params: &HashMap<String, String>) -> Result<String, BindingError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| BindingError::UnterminatedPlaceholder(template.to_string()))?;
        let name = &after[..end];
        let value = params
            .get(name)
            .ok_or_else(|| BindingError::MissingPathParam(name.to_string()))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
