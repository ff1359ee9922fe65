//! Backup object configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder replaced by the backup ID when rendering names.
const PLACEHOLDER: &str = "%s";

/// Settings consumed by the backup object model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Template used to derive a backup's `name` from its ID. Must contain
    /// exactly one `%s`; `%%` renders a literal `%`.
    #[serde(default = "default_name_template")]
    pub name_template: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            name_template: default_name_template(),
        }
    }
}

/// One piece of a parsed name template.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder,
}

impl BackupConfig {
    /// Render the name for the backup with the given ID.
    pub fn render_name(&self, id: &str) -> String {
        let mut name = String::with_capacity(self.name_template.len() + id.len());
        let mut substituted = false;
        for segment in segments(&self.name_template) {
            match segment {
                Segment::Literal(text) => name.push_str(text),
                Segment::Placeholder if !substituted => {
                    name.push_str(id);
                    substituted = true;
                }
                Segment::Placeholder => name.push_str(PLACEHOLDER),
            }
        }
        name
    }

    /// Check the template carries exactly one placeholder.
    pub fn validate(&self) -> Result<(), AppError> {
        let count = segments(&self.name_template)
            .iter()
            .filter(|s| **s == Segment::Placeholder)
            .count();
        match count {
            1 => Ok(()),
            n => Err(AppError::configuration(format!(
                "backup.name_template must contain exactly one '{PLACEHOLDER}', found {n} in '{}'",
                self.name_template
            ))),
        }
    }
}

/// Split a template into literals and `%s` placeholders, folding `%%` into
/// a literal `%`.
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'%') => {
                out.push(Segment::Literal(&template[start..=i]));
                i += 2;
                start = i;
            }
            Some(b's') => {
                out.push(Segment::Literal(&template[start..i]));
                out.push(Segment::Placeholder);
                i += 2;
                start = i;
            }
            _ => i += 1,
        }
    }
    out.push(Segment::Literal(&template[start..]));
    out
}

fn default_name_template() -> String {
    "backup-%s".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_template() {
        let config = BackupConfig::default();
        assert_eq!(config.render_name("a1"), "backup-a1");
    }

    #[test]
    fn test_validate_placeholder_count() {
        let ok = BackupConfig {
            name_template: "bk_%s_v".to_string(),
        };
        assert!(ok.validate().is_ok());

        let none = BackupConfig {
            name_template: "backup".to_string(),
        };
        assert!(none.validate().is_err());

        let two = BackupConfig {
            name_template: "%s-%s".to_string(),
        };
        assert!(two.validate().is_err());
    }

    #[test]
    fn test_escaped_percent_is_literal() {
        let config = BackupConfig {
            name_template: "backup-%%s-%s".to_string(),
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.render_name("a1"), "backup-%s-a1");

        let only_escaped = BackupConfig {
            name_template: "100%%-%%s".to_string(),
        };
        assert!(only_escaped.validate().is_err());
    }
}
