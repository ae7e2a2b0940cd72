// Rule-based skill scoring against a role taxonomy.

pub mod skill_scorer;
pub mod taxonomy;
