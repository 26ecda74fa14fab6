use crate::{
    data::{
        incident::{Incident, NewIncident},
        student::{NewStudent, Student},
        user::{NewUser, User},
    },
    error::ChalkResult,
};
use async_trait::async_trait;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn all_students(&self) -> ChalkResult<Vec<Student>>;
    async fn find_student(&self, id: i32) -> ChalkResult<Option<Student>>;
    async fn create_student(&self, new: NewStudent) -> ChalkResult<i32>;
    async fn update_student(&self, id: i32, new: NewStudent) -> ChalkResult<()>;
}

#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn all_incidents(&self) -> ChalkResult<Vec<Incident>>;
    async fn incidents_for_student(&self, student_id: i32) -> ChalkResult<Vec<Incident>>;
    async fn find_incident(&self, id: i32) -> ChalkResult<Option<Incident>>;
    async fn create_incident(&self, new: NewIncident) -> ChalkResult<i32>;
    async fn update_incident(&self, id: i32, new: NewIncident) -> ChalkResult<()>;
    ///`Ok(false)` when the store refused to delete, rather than an error
    async fn delete_incident(&self, id: i32) -> ChalkResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> ChalkResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> ChalkResult<Option<User>>;
    ///`None` when the email is already taken; the very first account is made an admin
    async fn create_user(&self, new: NewUser) -> ChalkResult<Option<User>>;
}
