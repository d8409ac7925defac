pub mod auth;
pub mod events;
pub mod inquiry;
pub mod property;
pub mod service_request;
