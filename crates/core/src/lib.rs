pub mod api;
pub mod bulk;
pub mod collection;
pub mod config;
pub mod lesson;
pub mod metrics;
pub mod session;
pub mod testing;
pub mod tracker;

pub use api::{CourseService, HttpCourseService, ServiceError};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use session::{CourseSession, SessionError};
