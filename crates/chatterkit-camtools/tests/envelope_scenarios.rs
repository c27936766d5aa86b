// Envelope scenario tests
// Candidate cuts checked against a mid-size VMC, with and without tap-test data.

use chatterkit_camtools::{plan_engagement, Constraint, EnvelopeSettings, EnvelopeValidator};
use chatterkit_core::{
    CuttingState, MachineLimits, MaterialClass, MaterialCuttingProperties, ModalOverride,
    ToolGeometry,
};
use chatterkit_dynamics::StabilityAnalyzer;

#[test]
fn test_overspeed_candidate_rejected() {
    // 12k / 15 kW / 80 N·m machine, candidate at 15000 rpm
    let machine = MachineLimits::new(12000.0, 15.0, 80.0);
    let state = CuttingState::at_rpm(15000.0, 1200.0, 1.0, 3.0);
    let verdict = EnvelopeValidator::new()
        .validate(
            &machine,
            &ToolGeometry::with_default_stickout(10.0, 3),
            &MaterialCuttingProperties::for_class(MaterialClass::Aluminum),
            &state,
        )
        .unwrap();

    assert!(!verdict.rpm_ok);
    assert!(!verdict.overall_ok);
    assert!(verdict.violates(Constraint::SpindleSpeed));
    assert!(verdict.violations.iter().all(|v| !v.message.is_empty()));
}

#[test]
fn test_every_failure_is_explained() {
    let machine =
        MachineLimits::new(10000.0, 2.0, 5.0).with_modal(ModalOverride::natural_frequency(900.0));
    let tool = ToolGeometry::with_default_stickout(16.0, 4);
    let material = MaterialCuttingProperties::for_class(MaterialClass::Steel);
    let validator = EnvelopeValidator::new();

    for rpm in [4000.0, 8000.0, 11000.0] {
        for depth in [0.5, 4.0, 12.0] {
            let verdict = validator
                .validate(
                    &machine,
                    &tool,
                    &material,
                    &CuttingState::at_rpm(rpm, 1500.0, depth, 4.0),
                )
                .unwrap();
            assert_eq!(
                verdict.overall_ok,
                verdict.rpm_ok && verdict.power_ok && verdict.torque_ok && verdict.stability_ok
            );
            assert_eq!(verdict.rpm_ok, !verdict.violates(Constraint::SpindleSpeed));
            assert_eq!(verdict.power_ok, !verdict.violates(Constraint::Power));
            assert_eq!(verdict.torque_ok, !verdict.violates(Constraint::Torque));
            assert_eq!(verdict.stability_ok, !verdict.violates(Constraint::Stability));
            if !verdict.overall_ok {
                assert!(!verdict.violations.is_empty());
            }
            // Geometry-derived stiffness for this tool saturates the ceiling
            assert_eq!(verdict.critical_depth, Some(50.0));
            assert!(verdict.low_confidence);
        }
    }
}

#[test]
fn test_zero_tolerance_setting_rejected() {
    let validator = EnvelopeValidator::with_settings(
        StabilityAnalyzer::new(),
        EnvelopeSettings {
            lobe_tolerance_rpm: 0.0,
            ..Default::default()
        },
    );
    let result = validator.validate(
        &MachineLimits::default(),
        &ToolGeometry::default(),
        &MaterialCuttingProperties::default(),
        &CuttingState::at_rpm(8000.0, 500.0, 1.0, 3.0),
    );
    assert!(result.unwrap_err().is_parameter_error());
}

#[test]
fn test_engagement_feeds_envelope_check() {
    // Plan an aluminium stepover, then check the compensated feed on the machine
    let tool = ToolGeometry::with_default_stickout(12.0, 3);
    let plan = plan_engagement(MaterialClass::Aluminum, tool.diameter).unwrap();
    let feed = plan.compensated_feed_rate(0.05, 10000.0, tool.flutes);
    assert!(feed > 0.05 * 10000.0 * 3.0);

    let state = CuttingState::at_rpm(10000.0, feed, 2.0, plan.radial_depth);
    let verdict = EnvelopeValidator::new()
        .validate(
            &MachineLimits::default(),
            &tool,
            &MaterialCuttingProperties::for_class(MaterialClass::Aluminum),
            &state,
        )
        .unwrap();
    assert!(verdict.rpm_ok);
    assert!(verdict.estimated_power > 0.0);

    let json = serde_json::to_value(&verdict).unwrap();
    assert!(json["overall_ok"].is_boolean());
    assert!(json["violations"].is_array());
}
