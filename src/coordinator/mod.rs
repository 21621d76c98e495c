//! The single coordinator context.
//!
//! Owns the page registry, the persisted MinPttLength and the status badge.
//! Everything else talks to it through a
//! [`CoordinatorHandle`](crate::channel::CoordinatorHandle).

pub mod badge;
pub mod registry;
pub mod service;

pub use badge::{BadgeProjector, BadgeState};
pub use registry::{PageRegistration, Registry, RegistryError};
pub use service::Coordinator;
