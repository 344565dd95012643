pub mod admin;
pub mod bid_response;
pub mod context;
pub mod events;
pub mod weave;
