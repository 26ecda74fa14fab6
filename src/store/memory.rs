//! In-process stand-in for postgres, so controllers can be tested without a database.

use crate::{
    data::{
        incident::{Incident, NewIncident},
        student::{NewStudent, Student},
        user::{NewUser, User},
    },
    error::ChalkResult,
    store::{IncidentStore, StudentStore, UserStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::{
    cmp::Reverse,
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::Mutex;
use uuid::Uuid;

struct StoredIncident {
    new: NewIncident,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    students: BTreeMap<i32, Student>,
    incidents: BTreeMap<i32, StoredIncident>,
    users: BTreeMap<Uuid, User>,
    next_id: i32,
}

impl Tables {
    fn incident(&self, id: i32, stored: &StoredIncident) -> Incident {
        let StoredIncident {
            new,
            created_at,
            updated_at,
        } = stored;

        Incident {
            id,
            student_id: new.student_id,
            student_name: self
                .students
                .get(&new.student_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            user_id: new.user_id,
            user_name: self
                .users
                .get(&new.user_id)
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            date_incident: new.date_incident,
            description: new.description.clone(),
            soluction: new.soluction.clone(),
            created_at: *created_at,
            updated_at: *updated_at,
        }
    }

    ///newest `date_incident` first, ties broken by newest id - same as the postgres store
    fn incidents_newest_first(&self) -> Vec<Incident> {
        let mut incidents: Vec<_> = self
            .incidents
            .iter()
            .map(|(id, stored)| self.incident(*id, stored))
            .collect();
        incidents.sort_by_key(|i| Reverse((i.date_incident, i.id)));
        incidents
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    refuse_deletes: AtomicBool,
}

impl MemoryStore {
    ///makes every following delete report failure, like a blocked delete would
    pub fn refuse_deletes(&self) {
        self.refuse_deletes.store(true, Ordering::SeqCst);
    }

    pub async fn count_incidents(&self) -> ChalkResult<i64> {
        Ok(i64::try_from(self.tables.lock().await.incidents.len()).unwrap_or(i64::MAX))
    }

    pub async fn add_user(&self, name: &str, admin: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@escola.example", name.to_lowercase()),
            bcrypt_hashed_password: SecretString::from("$2b$04$not.a.real.hash"),
            admin,
        };
        self.tables
            .lock()
            .await
            .users
            .insert(user.id, user.clone());
        user
    }

    pub async fn add_student(&self, name: &str) -> Student {
        let id = self
            .create_student(NewStudent {
                name: name.to_string(),
                responsible: None,
                contact_responsible: None,
                date_enrolment: None,
                image: None,
                status: true,
            })
            .await
            .expect("memory store never fails");
        self.find_student(id)
            .await
            .expect("memory store never fails")
            .expect("just added")
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn all_students(&self) -> ChalkResult<Vec<Student>> {
        let mut students: Vec<_> = self.tables.lock().await.students.values().cloned().collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    async fn find_student(&self, id: i32) -> ChalkResult<Option<Student>> {
        Ok(self.tables.lock().await.students.get(&id).cloned())
    }

    async fn create_student(&self, new: NewStudent) -> ChalkResult<i32> {
        let mut tables = self.tables.lock().await;
        tables.next_id += 1;
        let id = tables.next_id;
        let now = Utc::now();
        tables.students.insert(
            id,
            Student {
                id,
                name: new.name,
                responsible: new.responsible,
                contact_responsible: new.contact_responsible,
                date_enrolment: new.date_enrolment,
                image: new.image,
                status: new.status,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_student(&self, id: i32, new: NewStudent) -> ChalkResult<()> {
        if let Some(student) = self.tables.lock().await.students.get_mut(&id) {
            student.name = new.name;
            student.responsible = new.responsible;
            student.contact_responsible = new.contact_responsible;
            student.date_enrolment = new.date_enrolment;
            student.image = new.image;
            student.status = new.status;
            student.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl IncidentStore for MemoryStore {
    async fn all_incidents(&self) -> ChalkResult<Vec<Incident>> {
        Ok(self.tables.lock().await.incidents_newest_first())
    }

    async fn incidents_for_student(&self, student_id: i32) -> ChalkResult<Vec<Incident>> {
        Ok(self
            .tables
            .lock()
            .await
            .incidents_newest_first()
            .into_iter()
            .filter(|i| i.student_id == student_id)
            .collect())
    }

    async fn find_incident(&self, id: i32) -> ChalkResult<Option<Incident>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .incidents
            .get(&id)
            .map(|stored| tables.incident(id, stored)))
    }

    async fn create_incident(&self, new: NewIncident) -> ChalkResult<i32> {
        let mut tables = self.tables.lock().await;
        tables.next_id += 1;
        let id = tables.next_id;
        let now = Utc::now();
        tables.incidents.insert(
            id,
            StoredIncident {
                new,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_incident(&self, id: i32, new: NewIncident) -> ChalkResult<()> {
        if let Some(stored) = self.tables.lock().await.incidents.get_mut(&id) {
            stored.new = new;
            stored.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_incident(&self, id: i32) -> ChalkResult<bool> {
        if self.refuse_deletes.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.tables.lock().await.incidents.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> ChalkResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> ChalkResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, new: NewUser) -> ChalkResult<Option<User>> {
        let mut tables = self.tables.lock().await;
        if tables.email_taken(new.email.as_str()) {
            return Ok(None);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email.to_string(),
            bcrypt_hashed_password: SecretString::from(new.bcrypt_hashed_password),
            admin: tables.users.is_empty(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(Some(user))
    }
}
