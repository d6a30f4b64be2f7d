//! Document templates and text snippets.
//!
//! Templates are whole-document skeletons, snippets short trigger-expanded
//! fragments. Both carry `{{name}}` placeholder tokens that the caller
//! fills at insert time; unknown tokens survive filling untouched so a
//! half-filled template stays editable.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::SessionError;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap());

/// A whole-document skeleton. `id` is the stable key; `name` is display
/// text and may repeat across templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: SmolStr,
    pub name: SmolStr,
    #[serde(default)]
    pub category: SmolStr,
    pub content: String,
    /// Unix milliseconds; zero for builtins.
    #[serde(default)]
    pub created_at: u64,
    /// Unix milliseconds of the last insertion, absent until first use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<u64>,
    #[serde(default)]
    pub builtin: bool,
}

impl Template {
    /// Placeholder names in `content`, see [`placeholders`].
    pub fn placeholders(&self) -> Vec<SmolStr> {
        placeholders(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub trigger: SmolStr,
    pub content: String,
    #[serde(default)]
    pub description: String,
}

impl Snippet {
    pub fn placeholders(&self) -> Vec<SmolStr> {
        placeholders(&self.content)
    }
}

/// Placeholder names in first-appearance order, deduplicated.
pub fn placeholders(content: &str) -> Vec<SmolStr> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(content) {
        let name = SmolStr::new(&caps[1]);
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Substitute placeholder values. Tokens without a value stay as written.
pub fn fill(content: &str, values: &HashMap<SmolStr, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(content, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Templates every installation ships with, under fixed ids.
pub fn builtin_templates() -> Vec<Template> {
    let defaults = [
        (
            "builtin:meeting-notes",
            "Meeting Notes",
            "Work",
            "# Meeting Notes - {{date}}\n\n## Attendees\n\n- \n\n## Agenda\n\n1. \n\n## Action Items\n\n- [ ] \n",
        ),
        (
            "builtin:daily-journal",
            "Daily Journal",
            "Personal",
            "# {{date}}\n\n## Today\n\n\n## Notes\n\n",
        ),
        (
            "builtin:task-list",
            "Task List",
            "Personal",
            "# {{title}}\n\n- [ ] \n- [ ] \n- [ ] \n",
        ),
    ];
    defaults
        .into_iter()
        .map(|(id, name, category, content)| Template {
            id: SmolStr::new(id),
            name: SmolStr::new(name),
            category: SmolStr::new(category),
            content: content.to_owned(),
            created_at: 0,
            last_used: None,
            builtin: true,
        })
        .collect()
}

pub(crate) fn validate_templates(templates: &[Template]) -> Result<(), SessionError> {
    let mut ids: Vec<&SmolStr> = Vec::with_capacity(templates.len());
    for template in templates {
        if template.id.trim().is_empty() {
            return Err(SessionError::MissingField {
                entity: "template",
                field: "id",
            });
        }
        if template.name.trim().is_empty() {
            return Err(SessionError::MissingField {
                entity: "template",
                field: "name",
            });
        }
        if template.content.is_empty() {
            return Err(SessionError::MissingField {
                entity: "template",
                field: "content",
            });
        }
        if ids.contains(&&template.id) {
            return Err(SessionError::DuplicateTemplate {
                id: template.id.clone(),
            });
        }
        ids.push(&template.id);
    }
    Ok(())
}

pub(crate) fn validate_snippets(snippets: &[Snippet]) -> Result<(), SessionError> {
    let mut triggers: Vec<&SmolStr> = Vec::with_capacity(snippets.len());
    for snippet in snippets {
        if snippet.trigger.trim().is_empty() {
            return Err(SessionError::MissingField {
                entity: "snippet",
                field: "trigger",
            });
        }
        if snippet.content.is_empty() {
            return Err(SessionError::MissingField {
                entity: "snippet",
                field: "content",
            });
        }
        if triggers.contains(&&snippet.trigger) {
            return Err(SessionError::DuplicateSnippet {
                trigger: snippet.trigger.clone(),
            });
        }
        triggers.push(&snippet.trigger);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, name: &str, content: &str) -> Template {
        Template {
            id: SmolStr::new(id),
            name: SmolStr::new(name),
            category: SmolStr::default(),
            content: content.to_owned(),
            created_at: 0,
            last_used: None,
            builtin: false,
        }
    }

    #[test]
    fn placeholders_are_unique_in_order() {
        let names = placeholders("# {{title}}\n{{date}} and {{ title }} again");
        assert_eq!(names, ["title", "date"]);
    }

    #[test]
    fn fill_substitutes_known_and_keeps_unknown() {
        let mut values = HashMap::new();
        values.insert(SmolStr::new("title"), "Plan".to_owned());
        let filled = fill("# {{title}} on {{date}}", &values);
        assert_eq!(filled, "# Plan on {{date}}");
    }

    #[test]
    fn builtin_templates_are_well_formed() {
        let templates = builtin_templates();
        assert!(!templates.is_empty());
        assert!(validate_templates(&templates).is_ok());
        assert!(templates.iter().all(|t| t.builtin && t.last_used.is_none()));
        assert_eq!(templates[0].placeholders(), ["date"]);
    }

    #[test]
    fn duplicate_template_ids_are_rejected() {
        let err = validate_templates(&[template("a", "First", "x"), template("a", "Second", "y")])
            .unwrap_err();
        assert!(matches!(err, SessionError::DuplicateTemplate { .. }));

        // Display names may repeat; only the id is a key.
        assert!(
            validate_templates(&[template("a", "Letter", "x"), template("b", "Letter", "y")])
                .is_ok()
        );
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert!(matches!(
            validate_templates(&[template("  ", "A", "x")]),
            Err(SessionError::MissingField { field: "id", .. })
        ));
        assert!(matches!(
            validate_templates(&[template("t", "  ", "x")]),
            Err(SessionError::MissingField { field: "name", .. })
        ));
        assert!(matches!(
            validate_templates(&[template("t", "A", "")]),
            Err(SessionError::MissingField { field: "content", .. })
        ));

        let no_content = Snippet {
            trigger: SmolStr::new("tbl"),
            content: String::new(),
            description: String::new(),
        };
        assert!(matches!(
            validate_snippets(&[no_content]),
            Err(SessionError::MissingField { field: "content", .. })
        ));
    }

    #[test]
    fn stored_form_is_camel_case_and_omits_unused_stamp() {
        let record = serde_json::to_value(template("a", "A", "x")).unwrap();
        assert_eq!(record["createdAt"], 0);
        assert!(record.get("lastUsed").is_none());

        let parsed: Template = serde_json::from_value(serde_json::json!({
            "id": "a",
            "name": "A",
            "content": "x",
            "lastUsed": 17
        }))
        .unwrap();
        assert_eq!(parsed.last_used, Some(17));
    }
}
