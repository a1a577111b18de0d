//! `#[derive(Entity)]` wired into specifications.

use specwise::{AsDiscriminant, Entity as _, Lambda, Number, Spec, Timestamp, Value};
use specwise_macros::Entity;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Active = 1,
    Retired = 2,
}

impl AsDiscriminant for Status {
    fn discriminant(&self) -> u32 {
        *self as u32
    }
}

#[derive(Entity)]
struct Taxi {
    license: String,
    created_at: Timestamp,
    #[field(rename = "seats")]
    seat_count: u8,
    #[field(Enum)]
    status: Status,
    electric: bool,
    nickname: Option<String>,
    #[field(skip)]
    #[allow(dead_code)]
    notes: String,
    #[allow(dead_code)]
    drivers: Vec<String>,
}

fn taxi() -> Taxi {
    Taxi {
        license: "DEFAULT_LICENSE".into(),
        created_at: Timestamp(1_000),
        seat_count: 4,
        status: Status::Active,
        electric: true,
        nickname: None,
        notes: "internal".into(),
        drivers: vec!["Ann".into()],
    }
}

#[test]
fn field_values() {
    let t = taxi();
    assert_eq!(t.field_value("license"), Value::String("DEFAULT_LICENSE"));
    assert_eq!(t.field_value("created_at"), Value::Timestamp(Timestamp(1_000)));
    assert_eq!(t.field_value("seats"), Value::Number(Number::U64(4)));
    assert_eq!(t.field_value("status"), Value::Enum(1));
    assert_eq!(t.field_value("electric"), Value::Bool(true));
    assert_eq!(t.field_value("nickname"), Value::None);
}

#[test]
fn skipped_and_unsupported_fields_read_as_none() {
    let t = taxi();
    assert!(t.field_value("notes").is_none());
    assert!(t.field_value("drivers").is_none());
    assert!(t.field_value("seat_count").is_none());
}

#[test]
fn optional_field_with_value() {
    let t = Taxi {
        nickname: Some("Bolt".into()),
        ..taxi()
    };
    assert_eq!(t.field_value("nickname"), Value::String("Bolt"));
}

#[test]
fn generated_constants() {
    assert_eq!(Taxi::LICENSE, "license");
    assert_eq!(Taxi::SEATS, "seats");
    assert_eq!(
        Taxi::FIELDS,
        &["license", "created_at", "seats", "status", "electric", "nickname"]
    );
}

#[test]
fn derived_entity_in_a_composite() {
    let roomy = Spec::from_lambda(Lambda::<Taxi>::new("taxi", |t| t.field(Taxi::SEATS).gte(4u8)));
    let active = Spec::from_lambda(Lambda::<Taxi>::new("taxi", |t| {
        t.field(Taxi::STATUS).is_in([Status::Active.discriminant()])
    }));
    let rule = roomy.and(&active).and_not(&Spec::from_lambda(Lambda::new("taxi", |t| {
        t.field(Taxi::ELECTRIC).is(false)
    })));

    assert!(rule.is_satisfied_by(&taxi()));
    let retired = Taxi {
        status: Status::Retired,
        ..taxi()
    };
    assert!(!rule.is_satisfied_by(&retired));
}
