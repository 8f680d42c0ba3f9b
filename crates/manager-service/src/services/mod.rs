//! Service layer for the manager service.
//!
//! # Components
//!
//! - `campus` - HTTP client for the platform's public object API
//! - `courses` - Course listing and registration through GraphQL
//! - `users` - User profile lookups through GraphQL
//! - `platform` - Metered, typed GraphQL execution shared by the above

pub mod campus;
pub mod courses;
pub mod platform;
pub mod users;

pub use campus::CampusClient;
pub use courses::CourseService;
pub use users::UserService;
