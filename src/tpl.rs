use crate::error::Error;
use crate::result::Result;
use std::collections::HashMap;

/// How substituted values are escaped in `{{field}}` tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Inside a JSON string literal
    Json,
    /// Inside XML text or attribute values
    Xml,
    None,
}

impl Escape {
    fn apply(&self, value: &str) -> String {
        match self {
            Escape::None => value.to_string(),
            Escape::Json => {
                let quoted = serde_json::Value::from(value).to_string();
                quoted[1..quoted.len() - 1].to_string()
            }
            Escape::Xml => {
                let mut out = String::with_capacity(value.len());
                for c in value.chars() {
                    match c {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        '"' => out.push_str("&quot;"),
                        '\'' => out.push_str("&apos;"),
                        c => out.push(c),
                    }
                }
                out
            }
        }
    }
}

/// Template processor resolving `{{field}}` (escaped) and `{{{field}}}` (raw) tags
pub struct Tpl {
    variables: HashMap<String, String>,
    escape: Escape,
}

impl Tpl {
    pub fn new(escape: Escape) -> Self {
        Self {
            variables: HashMap::new(),
            escape,
        }
    }

    /// Register a variable with its value
    pub fn register<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.variables.insert(key.into(), value.into());
    }

    /// Render `input`, resolving every tag. Unknown fields render empty.
    pub fn parse(&self, input: &str) -> Result<String> {
        let mut result = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start..];

            let (open, close) = if after.starts_with("{{{") {
                ("{{{", "}}}")
            } else {
                ("{{", "}}")
            };
            let body = &after[open.len()..];
            let end = body.find(close).ok_or_else(|| {
                Error::Template(format!(
                    "unterminated tag at byte {}",
                    input.len() - after.len()
                ))
            })?;

            let key = body[..end].trim();
            if key.is_empty() || key.contains(['{', '}']) {
                return Err(Error::Template(format!(
                    "invalid tag \"{}{}{}\"",
                    open,
                    &body[..end],
                    close
                )));
            }

            let value = self.variables.get(key).map(String::as_str).unwrap_or("");
            if open == "{{{" {
                result.push_str(value);
            } else {
                result.push_str(&self.escape.apply(value));
            }

            rest = &body[end + close.len()..];
        }

        result.push_str(rest);
        Ok(result)
    }
}

impl Default for Tpl {
    fn default() -> Self {
        Self::new(Escape::None)
    }
}
