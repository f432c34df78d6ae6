//! Infrastructure layer: wire DTOs and in-memory collaborator implementations.

pub mod dto;
pub mod store;
