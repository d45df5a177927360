// Domain layer - Core merge types and input rules

pub mod model;
pub mod rules;
