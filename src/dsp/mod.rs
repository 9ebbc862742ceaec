//! Real-time DSP building blocks: the outbound carrier, the NCO/low-pass/
//! phase primitives, and the feature extractor built from them.

pub mod carrier;
pub mod features;
pub mod primitives;

pub use carrier::CarrierGenerator;
pub use features::{FeatureExtractor, MotionFeatures};
pub use primitives::{IirLowPass, Nco, PhaseUnwrapper};
