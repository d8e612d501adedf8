mod common;

use common::{data, keyword, record};
use field_props_core::{
    Deck, DeckKeyword, FieldProps, FieldPropsConfig, FieldPropsError, LegacyProperties,
    PropertyStore,
};

fn small_deck() -> Deck {
    Deck::new(vec![
        keyword("DIMENS", &["2 2 1"]),
        data("ACTNUM", "1 1 0 1"),
        data("PORO", "0.125 0.25 0.375 0.5"),
        data("FIPNUM", "1 2 1 2"),
        keyword("EQUALS", &["PERMX 50"]),
        keyword("COPY", &["PERMX PERMY", "PERMX PERMZ 1 1 1 1 1 1"]),
        keyword("MULTIPLY", &["PERMZ 0.1"]),
    ])
}

#[test]
fn test_deck_from_json() {
    let deck = small_deck();
    let json = serde_json::to_string(&deck).unwrap();
    let back: Deck = serde_json::from_str(&json).unwrap();

    let mut fp = FieldProps::from_deck(&back, FieldPropsConfig::default()).unwrap();
    assert_eq!(fp.get::<f64>("PORO").unwrap(), vec![0.125, 0.25, 0.5]);
    assert_eq!(fp.get::<i32>("FIPNUM").unwrap(), vec![1, 2, 2]);
}

#[test]
fn test_copy_then_multiply() {
    let mut fp = FieldProps::from_deck(&small_deck(), FieldPropsConfig::default()).unwrap();

    let permx = fp.get_global::<f64>("PERMX").unwrap();
    let permy = fp.get_global::<f64>("PERMY").unwrap();
    let permz = fp.get_global::<f64>("PERMZ").unwrap();

    assert_eq!(permx, permy);
    approx::assert_relative_eq!(permz[0], permx[0] * 0.1);
    // PERMZ only received cell (1, 1, 1); the rest stayed NaN
    assert!(permz[1..].iter().all(|v| v.is_nan()));
    assert_eq!(fp.defaulted::<f64>("PERMZ").unwrap(), vec![false, true, true, true]);
}

#[test]
fn test_absent_keyword_policies_differ() {
    let deck = small_deck();
    let legacy = LegacyProperties::from_deck(&deck, FieldPropsConfig::default()).unwrap();
    let mut fp = FieldProps::from_deck(&deck, FieldPropsConfig::default()).unwrap();

    // Unknown everywhere
    assert!(matches!(legacy.has_deck_int_property("NONONO"), Err(FieldPropsError::Logic(_))));
    assert!(!fp.has::<i32>("NONONO"));
    assert!(matches!(fp.get::<i32>("NONONO"), Err(FieldPropsError::Lookup(_))));

    // Known to the other element type only
    assert!(matches!(legacy.has_deck_double_property("FIPNUM"), Err(FieldPropsError::Logic(_))));
    assert!(!fp.has::<f64>("FIPNUM"));

    // Supported, absent
    assert_eq!(legacy.has_deck_int_property("SATNUM"), Ok(false));
    assert!(!fp.has::<i32>("SATNUM"));
    fp.assert::<i32>("SATNUM").unwrap();
    assert!(fp.has::<i32>("SATNUM"));
}

#[test]
fn test_errors_carry_keyword_location() {
    let mut deck = small_deck();
    deck.push(keyword("ADD", &["PORO 0.1 1 3 1 1 1 1"]).with_location("EDIT.INC", 8));

    match PropertyStore::from_deck(&deck, FieldPropsConfig::default()) {
        Err(FieldPropsError::Input { message, location }) => {
            assert_eq!(location.keyword, "ADD");
            assert_eq!(location.filename, "EDIT.INC");
            assert_eq!(location.lineno, 8);
            assert!(message.contains("outside"), "{message}");
        }
        other => panic!("expected input error, got {other:?}"),
    }
}

#[test]
fn test_limits_checked_after_processing() {
    let mut deck = small_deck();
    deck.push(keyword("ADD", &["PORO 0.7"]));

    assert!(matches!(
        PropertyStore::from_deck(&deck, FieldPropsConfig::default()),
        Err(FieldPropsError::InvalidArgument(_))
    ));

    let config = FieldPropsConfig {
        check_limits: false,
        ..Default::default()
    };
    let store = PropertyStore::from_deck(&deck, config).unwrap();
    approx::assert_relative_eq!(store.deck_property::<f64>("PORO").unwrap().data()[3], 1.2);
}

#[test]
fn test_layered_data_keywords_keep_earlier_values() {
    let mut deck = small_deck();
    deck.push(data("PORO", "2* 0.3 1*"));

    let store = PropertyStore::from_deck(&deck, FieldPropsConfig::default()).unwrap();
    let poro = store.deck_property::<f64>("PORO").unwrap();
    assert_eq!(poro.data(), &[0.125, 0.25, 0.3, 0.5]);
    assert_eq!(poro.was_defaulted(), &[true, true, false, true]);
}

#[test]
fn test_malformed_property_keywords_are_not_dropped() {
    let two_records = r#"[
        {"name": "DIMENS", "records": [[{"Int": 2}, {"Int": 1}, {"Int": 1}]]},
        {"name": "PORO", "data": true,
         "location": {"keyword": "PORO", "filename": "CASE.DATA", "lineno": 12},
         "records": [[{"Double": 0.25}, {"Double": 0.25}], [{"Double": 0.5}, {"Double": 0.5}]]}
    ]"#;
    let deck: Deck = serde_json::from_str(two_records).unwrap();
    match PropertyStore::from_deck(&deck, FieldPropsConfig::default()) {
        Err(FieldPropsError::Input { location, .. }) => {
            assert_eq!(location.keyword, "PORO");
            assert_eq!(location.lineno, 12);
        }
        other => panic!("expected input error, got {other:?}"),
    }

    // Same items, but built as a record keyword
    let mut deck = Deck::new(vec![keyword("DIMENS", &["2 1 1"])]);
    deck.push(DeckKeyword::new("PORO", vec![record("0.25 0.5")]));
    assert!(matches!(
        FieldProps::from_deck(&deck, FieldPropsConfig::default()),
        Err(FieldPropsError::Input { .. })
    ));
}

#[test]
fn test_integer_overflow_reported_not_wrapped() {
    let mut deck = Deck::new(vec![keyword("DIMENS", &["2 1 1"])]);
    deck.push(keyword("ADD", &["FIPNUM 2147483647"]).with_location("REGIONS.INC", 4));

    match PropertyStore::from_deck(&deck, FieldPropsConfig::default()) {
        Err(FieldPropsError::Input { message, location }) => {
            assert_eq!(location.filename, "REGIONS.INC");
            assert!(message.contains("overflows"), "{message}");
        }
        other => panic!("expected input error, got {other:?}"),
    }

    // MULTIREG on a region array is checked as well
    let mut deck = Deck::new(vec![keyword("DIMENS", &["2 1 1"])]);
    deck.push(data("FIPNUM", "2 1000000"));
    deck.push(keyword("MULTIREG", &["FIPNUM 1000000 1"]));
    assert!(PropertyStore::from_deck(&deck, FieldPropsConfig::default()).is_err());
}
