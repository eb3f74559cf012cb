//! Infrastructure layer: concrete storage, fan-out and wire formats.

pub mod broadcast;
pub mod dto;
pub mod repository;
