//! # ChatterKit
//!
//! A milling stability advisor for CNC machines:
//! - Regenerative chatter prediction for a single-DOF tool model
//! - Stability lobe diagrams and stable pocket extraction
//! - Closest stable spindle speed for a required depth
//! - Chip-thinning compensated radial engagement planning
//! - Spindle speed, power, torque and chatter checks against a machine
//!
//! ## Architecture
//!
//! ChatterKit is organized as a workspace with multiple crates:
//!
//! 1. **chatterkit-core** - Data models, errors, unit helpers
//! 2. **chatterkit-dynamics** - Modal model, critical depth, lobes, search, risk
//! 3. **chatterkit-camtools** - Engagement controller, envelope validator
//! 4. **chatterkit-settings** - Configuration files and defaults
//! 5. **chatterkit** - CLI binary that integrates all crates

pub mod cli;

pub use chatterkit_core::data;

pub use chatterkit_core::{
    CuttingState, Error, MachineLimits, MaterialClass, MaterialCuttingProperties, ModalOverride,
    ParameterError, Result, ToolGeometry, ToolOverrides,
};

pub use chatterkit_dynamics::{
    critical_depth, find_nearest_stable, ChatterRisk, CriticalDepth, DynamicsModel,
    ModalDefaults, Recommendation, RiskLevel, SearchSettings, SpeedRange, StabilityAnalyzer,
    StabilityLobeDiagram, StabilityRequest, StabilityResult, StabilitySettings, StablePocket,
};

pub use chatterkit_camtools::{
    chip_thinning_factor, plan_engagement, EngagementController, EngagementParameters,
    EngagementPlan, EnvelopeSettings, EnvelopeValidator, EnvelopeVerdict, Violation,
};

pub use chatterkit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout for reports
/// - RUST_LOG environment variable support
/// - JSON lines instead of the human format when `json` is set
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let installed = if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}
