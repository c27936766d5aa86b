//! # ChatterKit CAM Tools
//!
//! Planning helpers that sit on top of the stability model.
//!
//! - **Engagement**: radial stepover, chip-thinning feed compensation and
//!   entry defaults for a material class
//! - **Envelope**: spindle speed, power, torque and chatter checks folded
//!   into one verdict for a candidate cut

pub mod engagement;
pub mod envelope;

pub use engagement::{
    actual_chip, chip_thinning_factor, compensated_chip_load, engagement_angle_for_stepover,
    engagement_angles, plan_engagement, plan_for_stepover, radial_depth_for_angle,
    EngagementAngles, EngagementController, EngagementParameters, EngagementPlan, EntryPlan,
    MillingDirection, StepdownLimits,
};
pub use envelope::{
    estimate_power, Constraint, EnvelopeSettings, EnvelopeValidator, EnvelopeVerdict, Violation,
};
