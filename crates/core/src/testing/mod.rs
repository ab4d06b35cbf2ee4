//! Testing utilities and mock implementations for engine tests.
//!
//! This module provides a mock implementation of the course service trait,
//! allowing comprehensive testing without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use corso_core::testing::{fixtures, MockCourseService};
//!
//! let service = MockCourseService::new();
//! let course = service.add_course_with_index("Rust", fixtures::sample_index());
//!
//! // Configure mock behavior
//! service.push_error("generate_lesson", ServiceError::Timeout);
//! ```

pub mod fixtures;
mod mock_course_service;

pub use mock_course_service::MockCourseService;
