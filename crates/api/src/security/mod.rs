//! Response security headers

mod headers;

pub use headers::security_headers_middleware;
