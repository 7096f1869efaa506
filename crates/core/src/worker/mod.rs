pub mod error;
pub mod line_worker;
pub mod request;
