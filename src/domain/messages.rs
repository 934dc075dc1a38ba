use serde::{Deserialize, Serialize};

use crate::domain::entities::ContactMessageRecord;
use crate::domain::error::{DomainError, ensure_present};
use crate::domain::resource::{Collection, Resource};
use crate::domain::types::ResourceKind;

/// A message submitted through the public contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Messages only ever change their read flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl ContactMessagePatch {
    pub fn mark_read() -> Self {
        Self { read: Some(true) }
    }
}

impl Resource for ContactMessageRecord {
    type Id = i64;
    type Patch = ContactMessagePatch;

    const KIND: ResourceKind = ResourceKind::ContactMessage;

    fn id(&self) -> &i64 {
        &self.id
    }
}

impl Collection for ContactMessageRecord {
    type Draft = NewContactMessage;

    fn prepare_draft(draft: NewContactMessage) -> Result<NewContactMessage, DomainError> {
        ensure_present(&draft.name, "name")?;
        ensure_present(&draft.email, "email")?;
        ensure_present(&draft.message, "message")?;

        let email = draft.email.trim().to_string();
        if !looks_like_email(&email) {
            return Err(DomainError::validation(format!(
                "`{email}` is not a valid email address"
            )));
        }

        Ok(NewContactMessage {
            name: draft.name.trim().to_string(),
            email,
            message: draft.message.trim().to_string(),
        })
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Number of messages that have not been opened yet.
pub fn unread_count(messages: &[ContactMessageRecord]) -> usize {
    messages.iter().filter(|message| !message.read).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, email: &str, message: &str) -> NewContactMessage {
        NewContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn requires_every_field() {
        assert_eq!(
            ContactMessageRecord::prepare_draft(draft("", "a@b.c", "hola")),
            Err(DomainError::missing("name"))
        );
        assert_eq!(
            ContactMessageRecord::prepare_draft(draft("Ana", " ", "hola")),
            Err(DomainError::missing("email"))
        );
        assert_eq!(
            ContactMessageRecord::prepare_draft(draft("Ana", "a@b.c", "")),
            Err(DomainError::missing("message"))
        );
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["ana", "@example.com", "ana@", "ana@@example.com", "a na@x.io"] {
            assert!(
                matches!(
                    ContactMessageRecord::prepare_draft(draft("Ana", email, "hola")),
                    Err(DomainError::Validation { .. })
                ),
                "email: {email}"
            );
        }
    }

    #[test]
    fn trims_accepted_fields() {
        let prepared =
            ContactMessageRecord::prepare_draft(draft(" Ana ", " ana@example.com ", " hola "))
                .expect("prepared");
        assert_eq!(prepared, draft("Ana", "ana@example.com", "hola"));
    }

    #[test]
    fn mark_read_patch_serializes_flag() {
        assert_eq!(
            serde_json::to_value(ContactMessagePatch::mark_read()).expect("json"),
            serde_json::json!({ "read": true })
        );
    }
}
