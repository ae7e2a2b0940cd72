// Orchestration and the HTTP surface over the parsing, scoring, recommendation
// and similarity components.

pub mod handlers;
pub mod pipeline;
pub mod uploads;
