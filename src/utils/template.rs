use crate::utils::error::{ConvertError, Result};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_]+)\}").expect("placeholder regex is valid"));

/// Names of the `{placeholders}` appearing in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Substitutes every `{name}` in `template` with its value from `vars`.
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    if let Some(missing) = placeholders(template)
        .into_iter()
        .find(|name| !vars.iter().any(|(key, _)| *key == name.as_str()))
    {
        return Err(ConvertError::TemplateError {
            template: template.to_string(),
            reason: format!("no value for placeholder {{{}}}", missing),
        });
    }

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        vars.iter()
            .find(|(key, _)| *key == &caps[1])
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    });

    Ok(rendered.into_owned())
}
