pub mod incident;
pub mod student;
pub mod user;

///one validation failure, shown to the user as `"{label} {message}"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub label: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub const fn new(field: &'static str, label: &'static str, message: &'static str) -> Self {
        Self {
            field,
            label,
            message,
        }
    }

    pub const fn blank(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, "não pode ficar em branco")
    }

    pub const fn invalid(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, "não é válida")
    }

    pub fn full_message(&self) -> String {
        format!("{} {}", self.label, self.message)
    }
}

///`aria-invalid` for an input, when one of the errors is about its field
pub fn aria_invalid(errors: &[FieldError], field: &str) -> Option<&'static str> {
    errors.iter().any(|e| e.field == field).then_some("true")
}

pub fn blank_to_none(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}
