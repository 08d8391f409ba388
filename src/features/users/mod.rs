pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{api_routes, page_routes};
pub use services::UserService;
