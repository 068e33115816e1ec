/*
[INPUT]:  HTTP client configuration and backend endpoints
[OUTPUT]: HTTP responses and typed backend results
[POS]:    HTTP layer - REST communication with the automation backend
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod action;
pub mod auth;
pub mod client;
pub mod error;
pub mod region;
pub mod survey;
pub mod wilayah;

pub use error::{FasihError, Result};

pub use client::{ClientConfig, DEFAULT_BASE_URL, FasihClient};
