//! Request and Response models for the overlay API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AddPageRequest, AddTextBoxRequest, ProcessPagesRequest};
pub use responses::{
    CacheFetchResponse, CacheStatsResponse, CacheSummary, HealthResponse, HistoryResponse,
    HistoryStepResponse,
};
