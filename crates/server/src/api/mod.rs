pub mod courses;
pub mod error;
pub mod handlers;
pub mod lessons;
pub mod routes;

pub use routes::create_router;
