//! # ChatterKit Dynamics
//!
//! Single-degree-of-freedom regenerative chatter model for milling.
//!
//! ## Components
//!
//! - **Modal**: dynamics model from tool geometry or measured modal data
//! - **Critical Depth**: limiting axial depth at one spindle speed
//! - **Lobes**: stability lobe diagram and stable pocket extraction
//! - **Search**: closest stable speed for a required depth
//! - **Risk**: risk bands and operator recommendations
//! - **Analyzer**: the above composed into one stability report
//!
//! Every function is pure and deterministic; values may be shared freely
//! across threads.

pub mod analyzer;
pub mod critical_depth;
pub mod lobes;
pub mod modal;
pub mod risk;
pub mod search;

pub use analyzer::{StabilityAnalyzer, StabilityRequest, StabilityResult};
pub use critical_depth::{critical_depth, CriticalDepth, DepthLimits};
pub use lobes::{
    LobeSample, SpeedRange, StabilityLobeDiagram, StabilitySettings, StablePocket,
};
pub use modal::{DynamicsModel, ModalDefaults};
pub use risk::{ChatterRisk, Priority, Recommendation, RecommendationKind, RiskLevel};
pub use search::{find_nearest_stable, SearchSettings};
