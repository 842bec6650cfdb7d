pub mod dtos;
pub mod handlers;
