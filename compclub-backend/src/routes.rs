pub mod assignments;
pub mod events;
pub mod health;
pub mod status_emails;
pub mod users;
pub mod workshops;
