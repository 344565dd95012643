//! Auction Runner, Bid Response Submission, and Winner Selection
//! (§4.6, §4.7, §4.8).

pub mod events;
pub mod pools;
pub mod runner;
pub mod selection;
pub mod submission;

pub use events::{ingest as ingest_event, EventContext};
pub use runner::AuctionRunner;
pub use selection::select_winner;
pub use submission::{submit, SubmissionContext};
