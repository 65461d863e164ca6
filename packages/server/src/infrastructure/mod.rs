//! Infrastructure layer: concrete adapters for the domain interfaces.

pub mod dto;
pub mod message_pusher;
pub mod repository;
