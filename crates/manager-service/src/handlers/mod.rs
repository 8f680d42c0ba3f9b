//! HTTP request handlers for the manager service.

pub mod campus;
pub mod courses;
pub mod health;
pub mod metrics;
pub mod user;

pub use campus::{get_campus, get_campus_courses};
pub use courses::{register_course, unregister_course};
pub use health::{health_check, root};
pub use metrics::metrics_handler;
pub use user::{get_available_courses, get_user_courses, get_user_id, get_user_name, get_user_roles};
