use std::fmt;

/// The kinds of form controls the wizard knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Select,
    Checkbox,
    File,
}

impl FieldKind {
    /// Kinds filled by typing a profile value.
    pub const TEXT_LIKE: [FieldKind; 3] = [FieldKind::Text, FieldKind::Email, FieldKind::Tel];
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Email => write!(f, "email"),
            FieldKind::Tel => write!(f, "tel"),
            FieldKind::Select => write!(f, "select"),
            FieldKind::Checkbox => write!(f, "checkbox"),
            FieldKind::File => write!(f, "file"),
        }
    }
}

/// Raw naming attributes read off a live field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldIdentity {
    pub id: String,
    pub name: String,
    pub placeholder: String,
    /// Text of the `<label for=...>` pointing at the field, if any.
    pub label: String,
}

#[cfg(test)]
impl FieldIdentity {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }
}

/// Normalized view of a field used for keyword classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub identifier: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Joins the non-empty identity parts (id, name, placeholder, label) and lower-cases them.
    pub fn new(kind: FieldKind, identity: &FieldIdentity) -> Self {
        let identifier = [
            identity.id.as_str(),
            identity.name.as_str(),
            identity.placeholder.as_str(),
            identity.label.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        Self { identifier, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_joins_parts_in_lowercase() {
        let identity = FieldIdentity {
            id: "applicant_Email".into(),
            name: "".into(),
            placeholder: " Work Email ".into(),
            label: "E-mail address".into(),
        };
        let descriptor = FieldDescriptor::new(FieldKind::Email, &identity);
        assert_eq!(descriptor.identifier, "applicant_email work email e-mail address");
        assert_eq!(descriptor.kind, FieldKind::Email);
    }

    #[test]
    fn empty_identity_gives_empty_identifier() {
        let descriptor = FieldDescriptor::new(FieldKind::Text, &FieldIdentity::default());
        assert!(descriptor.identifier.is_empty());
    }

    #[test]
    fn kind_display() {
        assert_eq!(FieldKind::Tel.to_string(), "tel");
        assert_eq!(FieldKind::Checkbox.to_string(), "checkbox");
    }
}
