pub mod dashboard;
pub mod hierarchy;
pub mod me;
pub mod people;
pub mod roles;
pub mod settings;
pub mod statuses;
pub mod trips;
pub mod users;
