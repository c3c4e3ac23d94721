pub mod sensory;
