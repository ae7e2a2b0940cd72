// Model-based role recommendation over pre-fitted artifacts.

pub mod artifacts;
pub mod recommender;
