use crate::data::{FieldError, blank_to_none};
use bitflags::bitflags;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::FromRow;

pub const DATE_ENROLMENT_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub responsible: Option<String>,
    pub contact_responsible: Option<String>,
    pub date_enrolment: Option<NaiveDate>,
    pub image: Option<String>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

///what comes in from the new/edit forms - everything optional so that partial updates work
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct StudentForm {
    pub name: Option<String>,
    pub responsible: Option<String>,
    pub contact_responsible: Option<String>,
    pub date_enrolment: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
    ///hidden input sent alongside the status checkbox, as an unticked checkbox sends nothing
    pub has_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub responsible: Option<String>,
    pub contact_responsible: Option<String>,
    pub date_enrolment: Option<NaiveDate>,
    pub image: Option<String>,
    pub status: bool,
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct StudentValidationError: u8 {
        const NAME_BLANK =           0b0000_0001;
        const DATE_ENROLMENT_BAD =   0b0000_0010;
    }
}

impl StudentValidationError {
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.iter()
            .filter_map(|e| match e {
                Self::NAME_BLANK => Some(FieldError::blank("name", "Nome")),
                Self::DATE_ENROLMENT_BAD => {
                    Some(FieldError::invalid("date_enrolment", "Data de matrícula"))
                }
                _ => None,
            })
            .collect()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.field_errors()
            .iter()
            .map(FieldError::full_message)
            .collect()
    }
}

///form state that can be re-rendered when validation fails
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub responsible: String,
    pub contact_responsible: String,
    pub date_enrolment: String,
    pub image: String,
    pub status: bool,
}

impl StudentDraft {
    pub fn blank() -> Self {
        Self {
            status: true,
            ..Self::default()
        }
    }

    pub fn from_existing(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            responsible: student.responsible.clone().unwrap_or_default(),
            contact_responsible: student.contact_responsible.clone().unwrap_or_default(),
            date_enrolment: student
                .date_enrolment
                .map(|d| d.format(DATE_ENROLMENT_FORMAT).to_string())
                .unwrap_or_default(),
            image: student.image.clone().unwrap_or_default(),
            status: student.status,
        }
    }

    ///fields missing from the form keep what the draft already had
    pub fn apply(mut self, form: StudentForm) -> Self {
        let StudentForm {
            name,
            responsible,
            contact_responsible,
            date_enrolment,
            image,
            status,
            has_status,
        } = form;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(responsible) = responsible {
            self.responsible = responsible;
        }
        if let Some(contact_responsible) = contact_responsible {
            self.contact_responsible = contact_responsible;
        }
        if let Some(date_enrolment) = date_enrolment {
            self.date_enrolment = date_enrolment;
        }
        if let Some(image) = image {
            self.image = image;
        }
        if has_status.is_some() {
            self.status = status.is_some_and(|s| s == "on" || s == "true");
        }

        self
    }

    pub fn validate(&self) -> Result<NewStudent, StudentValidationError> {
        let mut errors = StudentValidationError::empty();

        let name = self.name.trim();
        if name.is_empty() {
            errors |= StudentValidationError::NAME_BLANK;
        }

        let date_enrolment = match blank_to_none(&self.date_enrolment) {
            None => None,
            Some(date) => {
                if let Ok(date) = NaiveDate::parse_from_str(date, DATE_ENROLMENT_FORMAT) {
                    Some(date)
                } else {
                    errors |= StudentValidationError::DATE_ENROLMENT_BAD;
                    None
                }
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewStudent {
            name: name.to_string(),
            responsible: blank_to_none(&self.responsible).map(ToString::to_string),
            contact_responsible: blank_to_none(&self.contact_responsible).map(ToString::to_string),
            date_enrolment,
            image: blank_to_none(&self.image).map(ToString::to_string),
            status: self.status,
        })
    }
}
