use pretty_assertions::assert_eq;

use tally_expr::Namespace;
use tally_expr::Value;

use super::*;

fn run(lines: &[&str], settings: &Settings) -> Vec<String> {
	let mut lines: Vec<String> = lines.iter().map(ToString::to_string).collect();
	let mut known = KnownVars::new();
	TextTransforms::new().apply(&mut lines, &mut known, settings);
	lines
}

fn run_with_ns(lines: &[&str], settings: &Settings, ns: &Namespace) -> Vec<String> {
	let mut lines: Vec<String> = lines.iter().map(ToString::to_string).collect();
	let mut known = KnownVars::from_namespace(ns);
	TextTransforms::new().apply(&mut lines, &mut known, settings);
	lines
}

fn all_off() -> Settings {
	Settings {
		implicit_multiply: false,
		caret_power: false,
		auto_lambda: false,
		auto_previous: false,
		auto_matrix: false,
		auto_date: false,
		parse_typeset: false,
		..Settings::default()
	}
}

#[test]
fn test_all_toggles_off_is_identity() {
	let lines = ["4x + f(x, y) = x", "next $x$ line"];
	assert_eq!(run(&lines, &all_off()), lines.to_vec());
}

#[test]
fn test_multiplication_glyph_normalizes() {
	assert_eq!(run(&["2⋅3"], &all_off()), vec!["2*3"]);
}

#[test]
fn test_caret_power_is_configurable() {
	let mut settings = all_off();
	assert_eq!(run(&["2^8"], &settings), vec!["2^8"]);
	settings.caret_power = true;
	assert_eq!(run(&["2^8"], &settings), vec!["2**8"]);
}

#[test]
fn test_implicit_multiply_known_variable() {
	let mut settings = all_off();
	settings.implicit_multiply = true;
	let mut ns = Namespace::new();
	ns.insert("x", Value::Int(3));
	assert_eq!(run_with_ns(&["4x"], &settings, &ns), vec!["4*x"]);
}

#[test]
fn test_implicit_multiply_unknown_identifier_is_untouched() {
	let mut settings = all_off();
	settings.implicit_multiply = true;
	assert_eq!(run(&["4q"], &settings), vec!["4q"]);
}

#[test]
fn test_implicit_multiply_unit_prefix_is_parenthesized() {
	struct Prefix;
	impl tally_expr::HostObject for Prefix {
		fn plain(&self) -> String {
			"MB".to_string()
		}
		fn is_unit_prefix(&self) -> bool {
			true
		}
	}

	let mut settings = all_off();
	settings.implicit_multiply = true;
	let mut ns = Namespace::new();
	ns.insert("MB", Value::Other(std::sync::Arc::new(Prefix)));
	assert_eq!(run_with_ns(&["4MB"], &settings, &ns), vec!["(4*MB)"]);
}

#[test]
fn test_engineering_exponent_is_never_spliced() {
	let mut settings = all_off();
	settings.implicit_multiply = true;
	let mut ns = Namespace::new();
	ns.insert("e", Value::Float(std::f64::consts::E));
	assert_eq!(run_with_ns(&["2e-4"], &settings, &ns), vec!["2e-4"]);
	assert_eq!(run_with_ns(&["2e"], &settings, &ns), vec!["2e"]);
}

#[test]
fn test_format_specifier_marker_suppresses_splice() {
	let mut settings = all_off();
	settings.implicit_multiply = true;
	let mut ns = Namespace::new();
	ns.insert("x", Value::Int(3));
	assert_eq!(run_with_ns(&["% 3x"], &settings, &ns), vec!["% 3x"]);
}

#[test]
fn test_same_submission_assignment_declares_variable() {
	let mut settings = all_off();
	settings.implicit_multiply = true;
	let rewritten = run(&["k = 10", "4k"], &settings);
	assert_eq!(rewritten, vec!["k = 10", "4*k"]);
}

#[test]
fn test_hex_literal_swallows_trailing_hex_letters() {
	let mut settings = all_off();
	settings.implicit_multiply = true;
	let mut ns = Namespace::new();
	ns.insert("ff", Value::Int(1));
	// 0xff lexes as one hex literal, not 0x times ff
	assert_eq!(run_with_ns(&["0xff"], &settings, &ns), vec!["0xff"]);
}

#[test]
fn test_typeset_span_is_protected_from_splicing() {
	let mut settings = all_off();
	settings.implicit_multiply = true;
	settings.parse_typeset = true;
	let mut ns = Namespace::new();
	ns.insert("x", Value::Int(3));
	let rewritten = run_with_ns(&[r"$2x$ + 4x"], &settings, &ns);
	assert_eq!(rewritten, vec![r#"parse_typeset("2x").subs(i, I) + 4*x"#]);
}

#[test]
fn test_typeset_renderer_escapes_backslashes() {
	let mut settings = all_off();
	settings.parse_typeset = true;
	let rewritten = run(&[r"$\frac{1}{2}$"], &settings);
	assert_eq!(rewritten, vec![r#"parse_typeset("\\frac{1}{2}").subs(i, I)"#]);
}

#[test]
fn test_previous_result_prefix_on_documented_operators() {
	let mut settings = all_off();
	settings.auto_previous = true;
	assert_eq!(run(&["+ 3"], &settings), vec!["_+ 3"]);
	assert_eq!(run(&["* 3"], &settings), vec!["_* 3"]);
	assert_eq!(run(&["/ 3"], &settings), vec!["_/ 3"]);
	// '-' stays ambiguous with negation
	assert_eq!(run(&["- 3"], &settings), vec!["- 3"]);
}

#[test]
fn test_previous_result_prefix_first_line_only() {
	let mut settings = all_off();
	settings.auto_previous = true;
	assert_eq!(run(&["1 + 1", "* 3"], &settings), vec!["1 + 1", "* 3"]);
}

#[test]
fn test_shorthand_lambda_rewrites() {
	let mut settings = all_off();
	settings.auto_lambda = true;
	assert_eq!(
		run(&["f(x, y) = x + y"], &settings),
		vec!["f = lambda x, y: x + y"]
	);
}

#[test]
fn test_shorthand_lambda_skips_comparison() {
	let mut settings = all_off();
	settings.auto_lambda = true;
	assert_eq!(run(&["f(x) == 3"], &settings), vec!["f(x) == 3"]);
}

#[test]
fn test_shorthand_lambda_disabled_is_untouched() {
	assert_eq!(run(&["f(x, y) = x + y"], &all_off()), vec!["f(x, y) = x + y"]);
}

#[test]
fn test_info_query_marker_is_stripped_and_reported() {
	let mut lines = vec!["?si".to_string()];
	let report = strip_info_marker(&mut lines);
	assert!(report.info_requested);
	assert_eq!(lines, vec!["si"]);

	let mut lines = vec!["?".to_string()];
	let report = strip_info_marker(&mut lines);
	assert!(!report.info_requested);
	assert_eq!(lines, vec!["?"]);
}

#[test]
fn test_pipeline_leaves_info_marker_alone() {
	assert_eq!(run(&["?si"], &all_off()), vec!["?si"]);
}

#[test]
fn test_reassigned_unit_prefix_splices_plain() {
	struct Prefix;
	impl tally_expr::HostObject for Prefix {
		fn plain(&self) -> String {
			"MB".to_string()
		}
		fn is_unit_prefix(&self) -> bool {
			true
		}
	}

	let mut settings = all_off();
	settings.implicit_multiply = true;
	let mut ns = Namespace::new();
	ns.insert("MB", Value::Other(std::sync::Arc::new(Prefix)));
	let rewritten = run_with_ns(&["MB = 3", "4MB"], &settings, &ns);
	assert_eq!(rewritten, vec!["MB = 3", "4*MB"]);
}
