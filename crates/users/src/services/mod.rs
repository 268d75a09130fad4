//! Business logic services for users

pub mod admin_service;
pub mod profile_service;

pub use admin_service::AdminService;
pub use profile_service::ProfileService;
