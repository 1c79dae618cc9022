//! Test doubles for the provider capability traits.

mod mocks;

pub use mocks::{MockContent, MockPublisher};
