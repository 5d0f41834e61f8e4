//! Shared integration test helpers

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_gateway;

pub use fixtures::TestRepo;
pub use mock_gateway::MockPrGateway;
