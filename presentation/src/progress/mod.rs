//! Progress reporting while waiting on the middleware

pub mod reporter;
