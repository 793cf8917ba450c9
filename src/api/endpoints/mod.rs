pub mod health;
pub mod reparse;
