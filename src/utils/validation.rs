use crate::utils::error::{ConvertError, Result};
use crate::utils::template::placeholders;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_extension(field_name: &str, file: &str, extension: &str) -> Result<()> {
    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if ext.eq_ignore_ascii_case(extension) => Ok(()),
        _ => Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!("File name must end in .{}", extension),
        }),
    }
}

/// Checks that a filename template uses only known placeholders and contains every required one.
pub fn validate_template(
    field_name: &str,
    template: &str,
    allowed: &[&str],
    required: &[&str],
) -> Result<()> {
    validate_non_empty_string(field_name, template)?;

    let used = placeholders(template);
    if let Some(unknown) = used.iter().find(|p| !allowed.contains(&p.as_str())) {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: format!(
                "Unknown placeholder {{{}}}. Allowed placeholders: {}",
                unknown,
                allowed
                    .iter()
                    .map(|p| format!("{{{}}}", p))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        });
    }

    for name in required {
        if !used.iter().any(|p| p == name) {
            return Err(ConvertError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!("Template must contain {{{}}}", name),
            });
        }
    }

    Ok(())
}
