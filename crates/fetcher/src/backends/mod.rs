//! Transport implementations

pub mod reqwest_backend;

pub use reqwest_backend::ReqwestTransport;
