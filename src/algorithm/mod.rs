pub mod constrained_transform;
pub mod input_normalizer;
pub mod line_tracker;
pub mod validation;
