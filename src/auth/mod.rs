//! Authentication
//!
//! Sale sessions only need to know who is ringing up a sale. Identity providers sit behind
//! [`AuthProvider`] so a hosted service can replace the in-memory one without touching the
//! ledger.

mod errors;
mod models;
mod service;

pub use errors::*;
pub use models::*;
pub use service::*;
