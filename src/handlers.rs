pub mod admin;
pub mod agent;
pub mod notifications;
pub mod service_requests;
pub mod trader;
