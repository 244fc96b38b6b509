//! quizkit-core: quiz progression and answer-validation engine.
//!
//! This crate defines the question/answer data model, the per-variant
//! validation and scoring logic, and the attempt lifecycle state machine
//! that the rest of the quizkit system builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod results;
pub mod state;
pub mod traits;
pub mod validator;
pub mod value;
