pub mod alert;
pub mod request;
pub mod response;

pub use alert::AlertCode;
pub use request::{AllocationRequest, DeliveryWindow, DemandUnit, FixtureError, OptimizationMode};
pub use response::{AllocationResponse, ResponseView};
