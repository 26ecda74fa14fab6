pub mod incidents;
pub mod index;
pub mod login;
pub mod outcome;
pub mod registration;
pub mod students;
