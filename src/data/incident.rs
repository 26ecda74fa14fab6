use crate::data::{FieldError, blank_to_none};
use bitflags::bitflags;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

///matches `datetime-local` inputs
pub const DATE_INCIDENT_FORMAT: &str = "%Y-%m-%dT%H:%M";

///an incident, joined with the names of the student and the user who reported it
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Incident {
    pub id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub date_incident: NaiveDateTime,
    pub description: String,
    pub soluction: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct IncidentForm {
    pub student_id: Option<String>,
    pub user_id: Option<String>,
    pub date_incident: Option<String>,
    pub description: Option<String>,
    pub soluction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    pub student_id: i32,
    pub user_id: Uuid,
    pub date_incident: NaiveDateTime,
    pub description: String,
    pub soluction: Option<String>,
}

bitflags! {
    ///iteration order is the order messages are shown in
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct IncidentValidationError: u8 {
        const STUDENT_BLANK =     0b0000_0001;
        const STUDENT_MISSING =   0b0000_0010;
        const USER_MISSING =      0b0000_0100;
        const DATE_BLANK =        0b0000_1000;
        const DATE_BAD =          0b0001_0000;
        const DESCRIPTION_BLANK = 0b0010_0000;
    }
}

impl IncidentValidationError {
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.iter()
            .filter_map(|e| match e {
                Self::STUDENT_BLANK => Some(FieldError::blank("student_id", "Aluno")),
                Self::STUDENT_MISSING => {
                    Some(FieldError::new("student_id", "Aluno", "deve existir"))
                }
                Self::USER_MISSING => Some(FieldError::new("user_id", "Usuário", "deve existir")),
                Self::DATE_BLANK => Some(FieldError::blank("date_incident", "Data da ocorrência")),
                Self::DATE_BAD => Some(FieldError::invalid("date_incident", "Data da ocorrência")),
                Self::DESCRIPTION_BLANK => Some(FieldError::blank("description", "Descrição")),
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

///the raw, user-facing state of an incident form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentDraft {
    pub student_id: String,
    pub user_id: String,
    pub date_incident: String,
    pub description: String,
    pub soluction: String,
}

impl IncidentDraft {
    pub fn from_existing(incident: &Incident) -> Self {
        Self {
            student_id: incident.student_id.to_string(),
            user_id: incident.user_id.to_string(),
            date_incident: incident
                .date_incident
                .format(DATE_INCIDENT_FORMAT)
                .to_string(),
            description: incident.description.clone(),
            soluction: incident.soluction.clone().unwrap_or_default(),
        }
    }

    ///fields missing from the form keep what the draft already had
    pub fn apply(mut self, form: IncidentForm) -> Self {
        let IncidentForm {
            student_id,
            user_id,
            date_incident,
            description,
            soluction,
        } = form;

        if let Some(student_id) = student_id {
            self.student_id = student_id;
        }
        if let Some(user_id) = user_id {
            self.user_id = user_id;
        }
        if let Some(date_incident) = date_incident {
            self.date_incident = date_incident;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(soluction) = soluction {
            self.soluction = soluction;
        }

        self
    }

    pub fn student_id(&self) -> Option<i32> {
        self.student_id.trim().parse().ok()
    }

    ///a blank reporter means whoever is submitting the form
    pub fn user_id_or(&self, current: Uuid) -> Option<Uuid> {
        match blank_to_none(&self.user_id) {
            None => Some(current),
            Some(id) => Uuid::try_parse(id).ok(),
        }
    }

    ///`student_exists` and `user_exists` come from the stores, as checking them needs IO
    pub fn validate(
        &self,
        current_user: Uuid,
        student_exists: bool,
        user_exists: bool,
    ) -> Result<NewIncident, IncidentValidationError> {
        let mut errors = IncidentValidationError::empty();

        let student_id = self.student_id();
        if student_id.is_none() {
            errors |= IncidentValidationError::STUDENT_BLANK;
        } else if !student_exists {
            errors |= IncidentValidationError::STUDENT_MISSING;
        }

        let user_id = self.user_id_or(current_user);
        if user_id.is_none() || !user_exists {
            errors |= IncidentValidationError::USER_MISSING;
        }

        let date_incident = match blank_to_none(&self.date_incident) {
            None => {
                errors |= IncidentValidationError::DATE_BLANK;
                None
            }
            Some(date) => {
                let parsed = parse_date_incident(date);
                if parsed.is_none() {
                    errors |= IncidentValidationError::DATE_BAD;
                }
                parsed
            }
        };

        let description = self.description.trim();
        if description.is_empty() {
            errors |= IncidentValidationError::DESCRIPTION_BLANK;
        }

        match (student_id, user_id, date_incident) {
            (Some(student_id), Some(user_id), Some(date_incident)) if errors.is_empty() => {
                Ok(NewIncident {
                    student_id,
                    user_id,
                    date_incident,
                    description: description.to_string(),
                    soluction: blank_to_none(&self.soluction).map(ToString::to_string),
                })
            }
            _ => Err(errors),
        }
    }
}

///accepts what browsers send for `datetime-local`, with or without seconds
fn parse_date_incident(date: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date, DATE_INCIDENT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
