//! Shared types for the response engine.

pub mod envelope;
pub mod format;
pub mod link;
pub mod pagination;
pub mod request;
pub mod stream;

pub use envelope::{ExceptionDetail, ResponseStructure};
pub use format::ResponseFormat;
pub use link::LinkObject;
pub use pagination::PaginatedData;
pub use request::RequestContext;
pub use stream::StreamItem;
