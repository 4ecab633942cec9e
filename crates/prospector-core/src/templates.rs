//! Built-in outreach message templates and `{{key}}` placeholder rendering.

use std::collections::HashMap;

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Email,
    Sms,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::Email => write!(f, "email"),
            TemplateKind::Sms => write!(f, "sms"),
        }
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(TemplateKind::Email),
            "sms" => Ok(TemplateKind::Sms),
            _ => Err(CoreError::InvalidTemplateKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: TemplateKind,
    /// Email subject line. SMS templates have none.
    pub subject: Option<&'static str>,
    pub body: &'static str,
    pub description: &'static str,
}

const EMAIL_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: "intro",
        name: "Introduction Email",
        kind: TemplateKind::Email,
        subject: Some("Automotive Solutions for {{dealership_name}}"),
        body: "Hi {{contact_name}},\n\nI work with independent dealers around {{city}} on \
               day-to-day operations and would like to learn how {{dealership_name}} runs \
               its lot.\n\nDo you have 15 minutes this week?",
        description: "Initial outreach to new prospects",
    },
    MessageTemplate {
        id: "followup",
        name: "Follow-up Email",
        kind: TemplateKind::Email,
        subject: Some("Following up on {{dealership_name}}"),
        body: "Hi {{contact_name}},\n\nFollowing up on my earlier note to \
               {{dealership_name}}. Happy to work around your schedule.",
        description: "Follow-up after initial contact",
    },
    MessageTemplate {
        id: "meeting",
        name: "Meeting Request",
        kind: TemplateKind::Email,
        subject: Some("Meeting Request - {{dealership_name}}"),
        body: "Hi {{contact_name}},\n\nCould we set up a short in-person or virtual \
               meeting with the {{dealership_name}} team?",
        description: "Request for in-person or virtual meeting",
    },
];

const SMS_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: "intro",
        name: "Introduction SMS",
        kind: TemplateKind::Sms,
        subject: None,
        body: "Hi {{contact_name}}, I help auto dealers improve operations. Quick 5min call?",
        description: "Initial SMS outreach",
    },
    MessageTemplate {
        id: "followup",
        name: "Follow-up SMS",
        kind: TemplateKind::Sms,
        subject: None,
        body: "Hi {{contact_name}}, following up on my message about dealership solutions.",
        description: "Follow-up SMS",
    },
];

#[must_use]
pub fn email_templates() -> &'static [MessageTemplate] {
    EMAIL_TEMPLATES
}

#[must_use]
pub fn sms_templates() -> &'static [MessageTemplate] {
    SMS_TEMPLATES
}

/// Look up a built-in template by kind and id.
///
/// # Errors
///
/// Returns [`CoreError::UnknownTemplate`] when no template has that id.
pub fn find_template(kind: TemplateKind, id: &str) -> Result<&'static MessageTemplate, CoreError> {
    let pool = match kind {
        TemplateKind::Email => EMAIL_TEMPLATES,
        TemplateKind::Sms => SMS_TEMPLATES,
    };
    pool.iter()
        .find(|t| t.id == id)
        .ok_or_else(|| CoreError::UnknownTemplate {
            kind: kind.to_string(),
            id: id.to_string(),
        })
}

/// Replace every `{{key}}` with its value from `vars`.
///
/// Whitespace inside the braces is ignored. Placeholders without a value and
/// unterminated `{{` are left as written.
#[must_use]
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after_open[..end].trim();
        match vars.get(key) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Build the placeholder map for a prospect.
///
/// `contact_name` falls back to `"there"` so greetings read naturally, and
/// `city` is taken from the second comma-separated address component.
#[must_use]
pub fn template_vars_for(
    dealership_name: &str,
    contact_name: Option<&str>,
    address: Option<&str>,
) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("dealership_name".to_string(), dealership_name.to_string());
    vars.insert(
        "contact_name".to_string(),
        contact_name
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("there")
            .to_string(),
    );
    if let Some(address) = address {
        vars.insert("address".to_string(), address.to_string());
        if let Some(city) = address.split(',').nth(1).map(str::trim) {
            if !city.is_empty() {
                vars.insert("city".to_string(), city.to_string());
            }
        }
    }
    vars
}
