//! `{placeholder}` path patterns.
//!
//! A pattern without placeholders is matched by exact string lookup and never
//! compiles a regex. Placeholders match exactly one non-empty segment.

use regex::Regex;

#[derive(Debug, Clone)]
pub(crate) struct PathPattern {
    /// `None` for literal paths
    regex: Option<Regex>,
    param_names: Vec<String>,
}

impl PathPattern {
    pub(crate) fn compile(path: &str) -> Result<Self, regex::Error> {
        if !path.contains('{') {
            return Ok(Self {
                regex: None,
                param_names: Vec::new(),
            });
        }
        let (regex, param_names) = path_to_regex(path)?;
        Ok(Self {
            regex: Some(regex),
            param_names,
        })
    }

    #[inline]
    pub(crate) fn is_literal(&self) -> bool {
        self.regex.is_none()
    }

    /// Captured placeholder values, in pattern order.
    pub(crate) fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let regex = self.regex.as_ref()?;
        let captures = regex.captures(path)?;
        let mut params = Vec::with_capacity(self.param_names.len());
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = captures.get(i + 1) {
                params.push((name.clone(), value.as_str().to_string()));
            }
        }
        Some(params)
    }
}

/// Convert a path pattern to an anchored regex and its parameter names.
///
/// `/users/{id}/posts` becomes `^/users/([^/]+)/posts$` with `["id"]`.
/// Static segments are escaped.
pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
    if path == "/" {
        return Ok((Regex::new(r"^/$")?, Vec::new()));
    }

    let mut pattern = String::with_capacity(path.len() + 5);
    pattern.push('^');
    let mut param_names = Vec::with_capacity(path.matches('{').count());

    for segment in path.split('/') {
        if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
            let param_name = &segment[1..segment.len() - 1];
            pattern.push_str("/([^/]+)");
            param_names.push(param_name.to_string());
        } else if !segment.is_empty() {
            pattern.push('/');
            pattern.push_str(&regex::escape(segment));
        }
    }
    if path.ends_with('/') {
        pattern.push('/');
    }

    pattern.push('$');
    Ok((Regex::new(&pattern)?, param_names))
}

/// Substitute placeholder segments with percent-encoded values. `None` when a
/// placeholder has no value.
pub(crate) fn fill_placeholders<'a, F>(path: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut filled = String::with_capacity(path.len());
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            filled.push('/');
        }
        if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
            let value = lookup(&segment[1..segment.len() - 1])?;
            filled.push_str(&encode_segment(value));
        } else {
            filled.push_str(segment);
        }
    }
    Some(filled)
}

fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
