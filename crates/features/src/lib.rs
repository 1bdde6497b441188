mod builder;
mod frame;

pub use builder::{FrameBuilder, HorizonFrameBuilder, TrainingFrameBuilder};
pub use frame::{FeatureFrame, FEATURE_NAMES};

#[cfg(test)]
mod tests;
