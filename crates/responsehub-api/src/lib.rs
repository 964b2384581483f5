//! # responsehub-api
//!
//! The response engine: envelope shaping, content negotiation, HATEOAS link
//! generation, conditional-request helpers, size-gated compression, and the
//! [`ApiResponseService`] that ties them together.
//!
//! [`ApiResponseService`]: service::ApiResponseService

pub mod compress;
pub mod formatter;
pub mod links;
pub mod localize;
pub mod logging;
pub mod negotiation;
pub mod routes;
pub mod service;
pub mod stream;
pub mod structure;
pub mod xml;

pub use formatter::{ResponseFormatter, WireResponse};
pub use links::HateoasLinkGenerator;
pub use routes::RouteTable;
pub use service::ApiResponseService;
