use fold_engine::EngineParams;

/// spec.md §6: unknown keys are silently ignored, comments and blank lines are skipped,
/// and a recognised key overrides the documented default.
#[test]
fn the_flat_key_value_parser_ignores_comments_and_unknown_keys() {
    let text = "\
# reconstruction tuning
Maxiter 80
BogusKey 7

Density 0.008
";
    let params = EngineParams::parse(text);
    assert_eq!(params.max_iter, 80);
    assert!((params.density - 0.008).abs() < 1e-9);
    assert_eq!(params.tang_iter, EngineParams::default().tang_iter);
}

/// §7: an out-of-range value is clamped (recoverable), never rejected outright.
#[test]
fn an_out_of_range_parameter_is_clamped_to_its_documented_bound() {
    let params = EngineParams::parse("Maxiter 10000\nDensity 0.5\n");
    assert_eq!(params.max_iter, 500);
    assert!((params.density - 0.012).abs() < 1e-9);
}
