pub mod app;
pub mod metrics;
pub mod permissions;
pub mod roles;
pub mod users;
pub mod view;
