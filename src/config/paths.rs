//! Typed parsing of path-list and mode options.
use crate::error::TreeError;
use crate::operations::Mode;

/// Parse a path-list option: a single string or a list of strings.
///
/// # Errors
///
/// Returns [`TreeError::InvalidArgument`] if `value` is neither, or if a
/// list contains a non-string element.
pub fn parse_path_list(name: &str, value: &toml::Value) -> Result<Vec<String>, TreeError> {
    match value {
        toml::Value::String(s) => Ok(vec![s.clone()]),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    TreeError::invalid(format!(
                        "Argument '{name}' contains one or more values of an invalid type"
                    ))
                })
            })
            .collect(),
        _ => Err(TreeError::invalid(format!(
            "Argument '{name}' is of an invalid type"
        ))),
    }
}

/// Parse a mode option: an octal string (`"0644"`) or an integer (`0o644`).
///
/// # Errors
///
/// Returns [`TreeError::InvalidArgument`] for anything else, or for values
/// above `0o7777`.
pub fn parse_mode(name: &str, value: &toml::Value) -> Result<Mode, TreeError> {
    let mode = match value {
        toml::Value::String(s) => Mode::from_octal(s),
        toml::Value::Integer(i) => u32::try_from(*i).ok().and_then(Mode::new),
        _ => None,
    };
    mode.ok_or_else(|| TreeError::invalid(format!("Argument '{name}' is not a valid mode: {value}")))
}
