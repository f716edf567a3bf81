//! Tests for [`Mode`].

use rstest::rstest;

use crate::Mode;

#[rstest]
#[case("exact", Mode::Exact)]
#[case("include", Mode::Include)]
#[case("include-with-order", Mode::IncludeWithOrder)]
#[case("TEXT", Mode::Text)]
fn modes_parse_from_kebab_case(#[case] input: &str, #[case] expected: Mode) {
    assert_eq!(input.parse::<Mode>(), Ok(expected));
}

#[test]
fn unknown_mode_is_rejected() {
    assert!("fuzzy".parse::<Mode>().is_err());
}

#[test]
fn include_is_the_default_mode() {
    assert_eq!(Mode::default(), Mode::Include);
}

#[rstest]
#[case(Mode::Exact, true, false)]
#[case(Mode::Include, true, true)]
#[case(Mode::IncludeWithOrder, true, true)]
#[case(Mode::Text, false, false)]
fn mode_predicates(#[case] mode: Mode, #[case] structural: bool, #[case] include: bool) {
    assert_eq!(mode.is_structural(), structural);
    assert_eq!(mode.is_include(), include);
}

#[test]
fn modes_serialise_as_kebab_case() {
    let json = serde_json::to_string(&Mode::IncludeWithOrder).expect("serialise");
    assert_eq!(json, "\"include-with-order\"");
    assert_eq!(Mode::IncludeWithOrder.to_string(), "include-with-order");
}
