pub mod convert;
pub mod links;
pub mod pins;
pub mod reference;
pub mod request;
pub mod schema;
pub mod service;
pub mod transform;
