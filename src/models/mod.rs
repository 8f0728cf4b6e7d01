//! Models Module
//!
//! Domain records and the request/response DTOs of the HTTP surface.

pub mod records;
pub mod requests;
pub mod responses;

pub use records::*;
pub use requests::*;
pub use responses::*;
