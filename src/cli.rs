//! Command-line interface
//!
//! A thin shell over the library: parse flags, build the request from the
//! configured defaults, run it and hand back the JSON report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chatterkit_camtools::{EngagementController, EngagementParameters, MillingDirection};
use chatterkit_core::{
    CuttingState, MachineLimits, MaterialClass, MaterialCuttingProperties, ModalOverride,
    ToolGeometry, ToolOverrides,
};
use chatterkit_dynamics::{SpeedRange, StabilityRequest};
use chatterkit_settings::Config;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

/// Milling stability advisor
#[derive(Debug, Parser)]
#[command(name = "chatterkit")]
#[command(about = "Chatter prediction, stability lobes and machine envelope checks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (.toml or .json); the platform config file is used when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate chatter stability of one cut
    Analyze {
        #[command(flatten)]
        tool: ToolArgs,
        #[command(flatten)]
        modal: ModalArgs,
        #[command(flatten)]
        material: MaterialArgs,
        /// Spindle speed (rev/min)
        #[arg(long)]
        rpm: f64,
        /// Axial depth of cut (mm)
        #[arg(long)]
        depth: f64,
    },

    /// Build a stability lobe diagram over a speed range
    Lobes {
        #[command(flatten)]
        tool: ToolArgs,
        #[command(flatten)]
        modal: ModalArgs,
        #[command(flatten)]
        material: MaterialArgs,
        /// Lowest speed (rev/min)
        #[arg(long, default_value_t = 2000.0)]
        min_rpm: f64,
        /// Highest speed (rev/min)
        #[arg(long, default_value_t = 24000.0)]
        max_rpm: f64,
        /// Number of sweep intervals
        #[arg(long, default_value_t = 500)]
        points: usize,
    },

    /// Plan radial engagement and chip-thinning compensation
    Engage {
        #[command(flatten)]
        tool: ToolArgs,
        /// Material name
        #[arg(long, default_value = "steel")]
        material: String,
        /// Pocket width bounding the helix entry (mm)
        #[arg(long)]
        pocket_width: Option<f64>,
        /// Explicit radial stepover (mm); the material's optimal angle is used otherwise
        #[arg(long)]
        stepover: Option<f64>,
        /// Plan for conventional instead of climb milling
        #[arg(long)]
        conventional: bool,
        /// Target chip thickness (mm/tooth) for the compensated feed
        #[arg(long, requires = "rpm")]
        chip_load: Option<f64>,
        /// Spindle speed for the compensated feed (rev/min)
        #[arg(long, requires = "chip_load")]
        rpm: Option<f64>,
    },

    /// Check a cut against the machine envelope
    Envelope {
        #[command(flatten)]
        tool: ToolArgs,
        #[command(flatten)]
        modal: ModalArgs,
        #[command(flatten)]
        material: MaterialArgs,
        /// Spindle speed (rev/min)
        #[arg(long, required_unless_present = "surface_speed")]
        rpm: Option<f64>,
        /// Surface speed (m/min)
        #[arg(long)]
        surface_speed: Option<f64>,
        /// Table feed (mm/min)
        #[arg(long)]
        feed: f64,
        /// Axial depth of cut (mm)
        #[arg(long)]
        depth: f64,
        /// Radial engagement (mm)
        #[arg(long, default_value_t = 0.0)]
        radial: f64,
        /// Machine spindle speed limit (rev/min)
        #[arg(long)]
        machine_max_rpm: Option<f64>,
        /// Machine spindle power limit (kW)
        #[arg(long)]
        machine_max_power: Option<f64>,
        /// Machine spindle torque limit (N·m)
        #[arg(long)]
        machine_max_torque: Option<f64>,
    },
}

/// Tool flags; unset values come from the configured tool profile
#[derive(Debug, Clone, Args)]
pub struct ToolArgs {
    /// Tool diameter (mm)
    #[arg(long)]
    pub diameter: Option<f64>,
    /// Number of flutes
    #[arg(long)]
    pub flutes: Option<u32>,
    /// Stickout (mm)
    #[arg(long)]
    pub stickout: Option<f64>,
}

impl ToolArgs {
    fn resolve(&self, config: &Config) -> ToolGeometry {
        config.tool.resolve(&ToolOverrides {
            diameter: self.diameter,
            flutes: self.flutes,
            stickout: self.stickout,
        })
    }
}

/// Measured modal parameters
#[derive(Debug, Clone, Args)]
pub struct ModalArgs {
    /// Measured natural frequency (Hz)
    #[arg(long)]
    pub natural_frequency: Option<f64>,
    /// Measured damping ratio
    #[arg(long)]
    pub damping: Option<f64>,
    /// Measured modal stiffness
    #[arg(long)]
    pub stiffness: Option<f64>,
}

impl ModalArgs {
    fn to_override(&self) -> ModalOverride {
        ModalOverride {
            natural_frequency: self.natural_frequency,
            damping_ratio: self.damping,
            modal_stiffness: self.stiffness,
        }
    }

    fn apply_over(&self, base: &ModalOverride) -> ModalOverride {
        ModalOverride {
            natural_frequency: self.natural_frequency.or(base.natural_frequency),
            damping_ratio: self.damping.or(base.damping_ratio),
            modal_stiffness: self.stiffness.or(base.modal_stiffness),
        }
    }
}

/// Workpiece material flags
#[derive(Debug, Clone, Args)]
pub struct MaterialArgs {
    /// Material name ("aluminum", "6061-T6", "316 stainless", ...)
    #[arg(long, default_value = "steel")]
    pub material: String,
    /// Specific cutting force K_c (N/mm²), overrides the class default
    #[arg(long)]
    pub kc: Option<f64>,
}

impl MaterialArgs {
    fn resolve(&self) -> MaterialCuttingProperties {
        let class = MaterialClass::from_name(&self.material);
        let properties = MaterialCuttingProperties::for_class(class);
        match self.kc {
            Some(kc) => properties.with_specific_cutting_force(kc),
            None => properties,
        }
    }
}

/// Load the configuration named on the command line, or the platform default
pub fn load_config(cli: &Cli) -> Result<Config> {
    Config::load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load default config".to_string(),
    })
}

/// Run a command and return its JSON report
pub fn run(command: &Command, config: &Config) -> Result<Value> {
    match command {
        Command::Analyze {
            tool,
            modal,
            material,
            rpm,
            depth,
        } => {
            let request = StabilityRequest {
                tool: tool.resolve(config),
                modal: modal.to_override(),
                material: material.resolve(),
                spindle_speed: *rpm,
                axial_depth: *depth,
            };
            let result = config
                .analyzer()
                .analyze(&request)
                .context("stability analysis failed")?;
            Ok(serde_json::to_value(result)?)
        }

        Command::Lobes {
            tool,
            modal,
            material,
            min_rpm,
            max_rpm,
            points,
        } => {
            let range = SpeedRange::new(*min_rpm, *max_rpm, *points);
            let sld = config
                .analyzer()
                .lobes(
                    &tool.resolve(config),
                    &modal.to_override(),
                    &material.resolve(),
                    &range,
                )
                .context("lobe sweep failed")?;
            Ok(json!({
                "best_pocket": sld.best_pocket(),
                "low_confidence_samples": sld.low_confidence_count(),
                "diagram": sld,
            }))
        }

        Command::Engage {
            tool,
            material,
            pocket_width,
            stepover,
            conventional,
            chip_load,
            rpm,
        } => {
            let geometry = tool.resolve(config);
            let plan = EngagementController::new(EngagementParameters {
                material: MaterialClass::from_name(material),
                tool_diameter: geometry.diameter,
                pocket_width: *pocket_width,
                stepover: *stepover,
                direction: if *conventional {
                    MillingDirection::Conventional
                } else {
                    MillingDirection::Climb
                },
            })
            .plan()
            .context("engagement planning failed")?;

            let compensated = match (chip_load, rpm) {
                (Some(chip), Some(rpm)) => json!({
                    "programmed_chip_load": plan.programmed_chip_load(*chip),
                    "feed_rate": plan.compensated_feed_rate(*chip, *rpm, geometry.flutes),
                }),
                _ => Value::Null,
            };
            Ok(json!({ "plan": plan, "compensated": compensated }))
        }

        Command::Envelope {
            tool,
            modal,
            material,
            rpm,
            surface_speed,
            feed,
            depth,
            radial,
            machine_max_rpm,
            machine_max_power,
            machine_max_torque,
        } => {
            let base = &config.machine;
            let machine = MachineLimits {
                max_rpm: machine_max_rpm.unwrap_or(base.max_rpm),
                max_power: machine_max_power.unwrap_or(base.max_power),
                max_torque: machine_max_torque.unwrap_or(base.max_torque),
                modal: modal.apply_over(&base.modal),
            };
            let state = CuttingState {
                spindle_speed: *rpm,
                surface_speed: *surface_speed,
                feed_rate: *feed,
                axial_depth: *depth,
                radial_depth: *radial,
            };
            let verdict = config
                .envelope_validator()
                .validate(&machine, &tool.resolve(config), &material.resolve(), &state)
                .context("envelope validation failed")?;
            Ok(serde_json::to_value(verdict)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_analyze_report() {
        let cli = parse(&[
            "chatterkit",
            "analyze",
            "--diameter",
            "12",
            "--flutes",
            "4",
            "--natural-frequency",
            "800",
            "--kc",
            "2000",
            "--rpm",
            "8000",
            "--depth",
            "2",
        ]);
        let report = run(&cli.command, &Config::default()).unwrap();
        assert!(report["stable"].is_boolean());
        let depth = report["critical_depth"].as_f64().unwrap();
        assert!((0.1..=50.0).contains(&depth));
        assert_eq!(report["natural_frequency"].as_f64(), Some(800.0));
    }

    #[test]
    fn test_lobes_report() {
        let cli = parse(&[
            "chatterkit",
            "lobes",
            "--natural-frequency",
            "800",
            "--stiffness",
            "20000",
            "--min-rpm",
            "4000",
            "--max-rpm",
            "16000",
            "--points",
            "120",
        ]);
        let report = run(&cli.command, &Config::default()).unwrap();
        assert_eq!(report["diagram"]["samples"].as_array().unwrap().len(), 121);
        assert!(report["diagram"]["stable_pockets"].is_array());
    }

    #[test]
    fn test_degenerate_range_rejected() {
        let cli = parse(&["chatterkit", "lobes", "--min-rpm", "9000", "--max-rpm", "9000"]);
        assert!(run(&cli.command, &Config::default()).is_err());
    }

    #[test]
    fn test_engage_with_compensated_feed() {
        let cli = parse(&[
            "chatterkit",
            "engage",
            "--material",
            "6061-T6",
            "--diameter",
            "10",
            "--flutes",
            "3",
            "--chip-load",
            "0.05",
            "--rpm",
            "12000",
        ]);
        let report = run(&cli.command, &Config::default()).unwrap();
        assert_eq!(report["plan"]["material"], "aluminum");
        assert!(report["compensated"]["feed_rate"].as_f64().unwrap() > 0.05 * 12000.0 * 3.0);
        assert_eq!(report["plan"]["entry"]["direction"], "climb");

        let cli = parse(&["chatterkit", "engage", "--diameter", "10", "--conventional"]);
        let report = run(&cli.command, &Config::default()).unwrap();
        assert_eq!(report["plan"]["entry"]["direction"], "conventional");
    }

    #[test]
    fn test_envelope_overspeed() {
        let cli = parse(&[
            "chatterkit",
            "envelope",
            "--rpm",
            "15000",
            "--feed",
            "800",
            "--depth",
            "1",
            "--machine-max-rpm",
            "12000",
        ]);
        let report = run(&cli.command, &Config::default()).unwrap();
        assert_eq!(report["rpm_ok"], false);
        assert_eq!(report["overall_ok"], false);
        assert_eq!(report["violations"][0]["constraint"], "spindle_speed");
    }

    #[test]
    fn test_envelope_requires_a_speed() {
        let parsed = Cli::try_parse_from(["chatterkit", "envelope", "--feed", "800", "--depth", "1"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&[
            "chatterkit",
            "--json-log",
            "analyze",
            "--rpm",
            "6000",
            "--depth",
            "1",
            "--config",
            "/tmp/chatterkit.toml",
        ]);
        assert!(cli.json_log);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/chatterkit.toml")));
    }
}
