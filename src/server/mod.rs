mod browse;
pub mod dto;
mod extract;
mod records;
pub mod response;
mod router;
pub mod validation;

pub use router::{AppState, create_router};
