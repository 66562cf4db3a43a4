pub mod api;
pub mod filters;
pub mod pagination;
pub mod records;

pub use api::{ApiError, HttpRecordApi, RecordApi};
pub use pagination::Paginator;
pub use records::{Deal, Entity, Lead, ListEnvelope, StageCount};
