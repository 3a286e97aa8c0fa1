pub mod error;
pub mod export;
pub mod grammar;
pub mod preset;
pub mod turtle;
pub mod viewer;

pub use error::LsystemError;
pub use export::save_png;
pub use grammar::{
    expand, expand_with_rng, Limits, Rule, RuleSet, MAX_ITERATIONS, MAX_SEQUENCE_LEN,
};
pub use preset::{Preset, RuleSpec};
pub use turtle::{
    interpret, interpret_with_rng, Geometry, Point, Segment, JITTER_MAX, JITTER_MIN,
};
pub use viewer::{spawn_viewer, Scene};
