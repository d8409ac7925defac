pub mod agent_profile_service;
pub mod auth;
pub mod dispatcher;
pub mod guard;
pub mod inquiry_service;
pub mod service_request_service;
