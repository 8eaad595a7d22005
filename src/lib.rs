//! Contract verification suite for the Smart Fuel Allocation (SFA) API.
//!
//! Submits allocation requests to `POST {base_url}/api/allocate` and checks
//! every response against the documented business rules. Each rule runs
//! independently and all outcomes are collected into a [`VerificationReport`].

pub mod checks;
pub mod client;
pub mod config;
pub mod fixtures;
pub mod logger;
pub mod models;
pub mod scenario;
pub mod utils;

pub use crate::checks::{verify_response, CheckFailure, Rule, RuleOutcome, RuleStatus};
pub use crate::client::{AllocationClient, ClientError};
pub use crate::config::{AlertPolicy, Config, ReportFormat};
pub use crate::models::{AllocationRequest, AllocationResponse};
pub use crate::scenario::{run_scenario, Scenario, ScenarioError, VerificationReport};
