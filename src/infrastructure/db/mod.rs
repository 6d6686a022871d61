pub mod connection;
pub mod ideas;
pub mod projects;
pub mod tasks;
