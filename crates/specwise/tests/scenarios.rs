//! End-to-end behaviour of composed taxi rules under both strategies.

use specwise::{
    Entity, ExpressionSpecification, Lambda, Spec, SpecError, Specification, Timestamp, Value,
};

const DEFAULT_LICENSE: &str = "DEFAULT_LICENSE";

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone)]
struct Taxi {
    license: String,
    created_at: Timestamp,
    drivers: Vec<String>,
}

impl Taxi {
    fn new(license: &str, created_at: Timestamp) -> Self {
        Taxi {
            license: license.to_string(),
            created_at,
            drivers: Vec::new(),
        }
    }

    fn driven_by(mut self, driver: &str) -> Self {
        self.drivers.push(driver.to_string());
        self
    }
}

impl Entity for Taxi {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "license" => Value::String(&self.license),
            "created_at" => Value::Timestamp(self.created_at),
            _ => Value::None,
        }
    }
}

struct LicenseSpec(String);

impl ExpressionSpecification<Taxi> for LicenseSpec {
    fn as_expression(&self) -> Lambda<Taxi> {
        Lambda::new("taxi", |t| {
            t.field("license")
                .contains(&self.0)
                .or(t.field("license").eq_ignore_case(&self.0))
        })
    }
}

struct CreatedAtBeforeSpec(Timestamp);

impl ExpressionSpecification<Taxi> for CreatedAtBeforeSpec {
    fn as_expression(&self) -> Lambda<Taxi> {
        Lambda::new("taxi", |t| t.field("created_at").before(self.0))
    }
}

struct CreatedAtAfterSpec(Timestamp);

impl ExpressionSpecification<Taxi> for CreatedAtAfterSpec {
    fn as_expression(&self) -> Lambda<Taxi> {
        Lambda::new("taxi", |t| t.field("created_at").after(self.0))
    }
}

/// Collection-valued field: only expressible as an in-memory predicate.
struct AnyDriverSpec;

impl Specification<Taxi> for AnyDriverSpec {
    fn is_satisfied_by(&self, candidate: &Taxi) -> bool {
        !candidate.drivers.is_empty()
    }
}

fn license(value: &str) -> Spec<Taxi> {
    Spec::expression(LicenseSpec(value.to_string()))
}

fn before(ts: Timestamp) -> Spec<Taxi> {
    Spec::expression(CreatedAtBeforeSpec(ts))
}

fn after(ts: Timestamp) -> Spec<Taxi> {
    Spec::expression(CreatedAtAfterSpec(ts))
}

/// Routes engine logs to the test output; `RUST_LOG=specwise=debug` shows
/// operand bridging and per-call compilation.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Evaluates through the merged expression tree only.
fn via_expression(spec: &Spec<Taxi>, taxi: &Taxi) -> bool {
    let lambda = spec.as_expression().expect("expression-capable spec");
    lambda.compile().expect("single-parameter tree").call(taxi)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn license_and_created_in_the_past() {
    let now = Timestamp::now();
    let rule = license(DEFAULT_LICENSE).and(&before(now));
    let taxi = Taxi::new(DEFAULT_LICENSE, now.offset_days(-10));

    assert!(rule.is_satisfied_by(&taxi));
    assert!(via_expression(&rule, &taxi));
}

#[test]
fn license_and_created_in_the_future() {
    let now = Timestamp::now();
    let rule = license(DEFAULT_LICENSE).and(&before(now));
    let taxi = Taxi::new(DEFAULT_LICENSE, now.offset_days(10));

    assert!(!rule.is_satisfied_by(&taxi));
    assert!(!via_expression(&rule, &taxi));
}

#[test]
fn or_with_only_right_matching() {
    let now = Timestamp::now();
    let rule = license("NOPE").or(&after(now.offset_days(-1)));
    let taxi = Taxi::new(DEFAULT_LICENSE, now);

    assert!(rule.is_satisfied_by(&taxi));
    assert!(via_expression(&rule, &taxi));
}

#[test]
fn and_not() {
    let now = Timestamp::now();
    let rule = license(DEFAULT_LICENSE).and_not(&before(now));

    let young = Taxi::new(DEFAULT_LICENSE, now.offset_days(1));
    assert!(rule.is_satisfied_by(&young));
    assert!(via_expression(&rule, &young));

    let old = Taxi::new(DEFAULT_LICENSE, now.offset_days(-1));
    assert!(!rule.is_satisfied_by(&old));
    assert!(!via_expression(&rule, &old));
}

#[test]
fn license_matches_ignoring_case() {
    let rule = license("default_license");
    assert!(rule.is_satisfied_by(&Taxi::new(DEFAULT_LICENSE, Timestamp(0))));
    assert!(!rule.is_satisfied_by(&Taxi::new("DEFAULT_LICENSE_2", Timestamp(0))));
}

#[test]
fn nested_composite_over_boundary_table() {
    init_tracing();
    let threshold = Timestamp::from_secs(1_700_000_000);
    // license("LIC") AND before(threshold) OR NOT after(threshold)
    let nested = license("LIC")
        .and(&before(threshold))
        .or(&after(threshold).not());

    let table = [
        (Taxi::new("", threshold), true),
        (Taxi::new("   ", threshold.offset_days(1)), false),
        (Taxi::new("LIC", threshold.offset_days(1)), false),
        (Taxi::new("lic", threshold.offset_days(-1)), true),
        (Taxi::new("A_LIC_B", Timestamp(threshold.as_millis() + 1)), false),
        (Taxi::new("A_LIC_B", Timestamp(threshold.as_millis() - 1)), true),
    ];

    let in_memory = Spec::from_fn("license", |t: &Taxi| {
        t.license.contains("LIC") || t.license.eq_ignore_ascii_case("LIC")
    })
    .and(&Spec::from_fn("before", move |t: &Taxi| t.created_at < threshold))
    .or(&Spec::from_fn("after", move |t: &Taxi| t.created_at > threshold).not());
    assert!(!in_memory.is_expression_capable());

    for (taxi, expected) in &table {
        assert_eq!(nested.is_satisfied_by(taxi), *expected, "{:?}", taxi);
        assert_eq!(via_expression(&nested, taxi), *expected, "{:?}", taxi);
        assert_eq!(in_memory.is_satisfied_by(taxi), *expected, "{:?}", taxi);
    }
}

#[test]
fn mixed_operands_bridge_opaque_predicates() {
    init_tracing();
    let now = Timestamp::now();
    let drivers = Spec::predicate(AnyDriverSpec);

    // Expression receiver: the opaque operand is bridged into the tree.
    let rule = before(now).and(&drivers);
    assert!(rule.is_expression_capable());
    let lambda = rule.as_expression().unwrap();
    assert!(lambda.free_params().is_empty());
    assert_eq!(
        lambda.to_string(),
        format!("taxi => (taxi.created_at before @{} && AnyDriverSpec(taxi))", now.as_millis())
    );

    // Opaque receiver: an in-memory composite.
    let reversed = drivers.and(&before(now));
    assert!(!reversed.is_expression_capable());
    assert!(reversed.as_expression().is_none());

    let staffed = Taxi::new("X", now.offset_days(-2)).driven_by("Ann");
    let empty = Taxi::new("X", now.offset_days(-2));
    for spec in [&rule, &reversed] {
        assert!(spec.is_satisfied_by(&staffed));
        assert!(!spec.is_satisfied_by(&empty));
    }
}

#[test]
fn composites_do_not_mutate_operands() {
    let now = Timestamp::now();
    let base = license(DEFAULT_LICENSE);
    let before_text = base.to_string();
    let _ = base.and(&before(now)).or(&base.not()).and_not(&base);
    assert_eq!(base.to_string(), before_text);
}

// ============================================================================
// Argument errors
// ============================================================================

#[test]
fn missing_operand_fails_before_evaluation() {
    let spec = license(DEFAULT_LICENSE);
    for result in [
        spec.try_and(None),
        spec.try_or(None),
        spec.try_and_not(None),
        spec.try_or_not(None),
    ] {
        assert!(matches!(
            result,
            Err(SpecError::MissingOperand { name: "right" })
        ));
    }
    let drivers = Spec::predicate(AnyDriverSpec);
    assert!(matches!(
        drivers.try_and(None),
        Err(SpecError::MissingOperand { .. })
    ));
}

#[test]
fn missing_candidate_is_an_error_for_every_kind() {
    let now = Timestamp::now();
    let specs = [
        license(DEFAULT_LICENSE),
        Spec::predicate(AnyDriverSpec),
        license(DEFAULT_LICENSE).and(&before(now)),
        Spec::predicate(AnyDriverSpec).or(&before(now)),
    ];
    for spec in &specs {
        assert!(matches!(spec.evaluate(None), Err(SpecError::MissingCandidate)));
    }
    let taxi = Taxi::new(DEFAULT_LICENSE, now.offset_days(-1));
    assert!(specs[2].evaluate(Some(&taxi)).unwrap());
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn shared_spec_across_threads() {
    let now = Timestamp::now();
    let rule = license(DEFAULT_LICENSE)
        .and(&before(now))
        .or(&Spec::predicate(AnyDriverSpec));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let rule = rule.clone();
            std::thread::spawn(move || {
                let taxi = Taxi::new(DEFAULT_LICENSE, now.offset_days(-i - 1));
                rule.is_satisfied_by(&taxi)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
