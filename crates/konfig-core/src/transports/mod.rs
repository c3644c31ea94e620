//! Built-in transports
//!
//! One handler per URL scheme. The registry bundle transport lives in the
//! `konfig-oci` crate and is registered onto the resolver by the caller.

mod data;
mod file;
mod http;
mod internal;
mod kustomize;

pub use data::DataTransport;
pub use file::FileTransport;
pub use http::HttpTransport;
pub use internal::InternalTransport;
pub use kustomize::KustomizeTransport;
