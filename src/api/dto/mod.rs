//! Data Transfer Objects for REST request/response serialization.
//!
//! Request bodies carry the entity fields plus an optional `performed_by`
//! naming the acting user for the audit trail. Responses reuse the domain
//! types directly.

pub mod alert_dto;
pub mod common_dto;
pub mod device_dto;

pub use alert_dto::*;
pub use common_dto::*;
pub use device_dto::*;
