use card_catalog::models::DatasetRow;
use card_catalog::{apply_filters, CardRecord, CardType, FilterSelection};

// Helper function to create test card data
fn create_test_card(
    id: &str,
    ext_number: &str,
    colors: &str,
    card_type: &str,
    cost: &str,
    power: &str,
    counter: &str,
    attribute: &str,
) -> CardRecord {
    DatasetRow {
        product_id: id.to_string(),
        name: format!("Card {}", id),
        clean_name: format!("Card {}", id),
        ext_number: ext_number.to_string(),
        ext_color: colors.to_string(),
        ext_card_type: card_type.to_string(),
        ext_cost: cost.to_string(),
        ext_power: power.to_string(),
        ext_counterplus: counter.to_string(),
        ext_attribute: attribute.to_string(),
        ..Default::default()
    }
    .into_record("test.csv", "OP09")
}

fn sample_catalog() -> Vec<CardRecord> {
    vec![
        create_test_card("1", "OP09-001", "Red", "Leader", "", "5000", "", "Strike"),
        create_test_card("2", "OP09-002", "Red", "Character", "3", "4000", "1000", "Slash"),
        create_test_card("3", "OP09-003", "Red", "Event", "1", "", "", ""),
        create_test_card("4", "OP01-004", "Blue;Green", "Character", "5", "6000", "", "Wisdom"),
        create_test_card("5", "ST01-005", "Green", "Stage", "1", "", "", ""),
        create_test_card("6", "OP09-006", "Purple;Red", "Character", "3", "5000", "2000", "Special"),
    ]
}

fn ids(cards: &[CardRecord]) -> Vec<&str> {
    cards.iter().map(|c| c.product_id.as_str()).collect()
}

#[test]
fn test_empty_selection_returns_full_catalog_in_order() {
    let catalog = sample_catalog();

    let result = apply_filters(&catalog, &FilterSelection::default());

    assert_eq!(result, catalog);
}

#[test]
fn test_filtering_is_idempotent() {
    let catalog = sample_catalog();
    let selection = FilterSelection {
        colors: ["Red".to_string()].into(),
        costs: [3].into(),
        ..Default::default()
    };

    let first = apply_filters(&catalog, &selection);
    let second = apply_filters(&catalog, &selection);

    assert_eq!(first, second);
    assert_eq!(ids(&first), vec!["2", "6"]);
    // Input untouched
    assert_eq!(catalog, sample_catalog());
}

#[test]
fn test_and_across_facets_or_within_facet() {
    let selection = FilterSelection {
        colors: ["Red".to_string(), "Blue".to_string()].into(),
        types: [CardType::Character].into(),
        ..Default::default()
    };

    let red_character = create_test_card("a", "OP09-010", "Red", "Character", "1", "", "", "");
    let red_event = create_test_card("b", "OP09-011", "Red", "Event", "1", "", "", "");
    let blue_character = create_test_card("c", "OP09-012", "Blue", "Character", "1", "", "", "");

    assert!(selection.matches(&red_character));
    assert!(!selection.matches(&red_event));
    assert!(selection.matches(&blue_character));
}

#[test]
fn test_multicolor_only_excludes_single_color_cards() {
    let catalog = sample_catalog();

    let selection = FilterSelection {
        multicolor_only: true,
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &selection)), vec!["4", "6"]);

    // Selected colors narrow multicolor cards further
    let selection = FilterSelection {
        multicolor_only: true,
        colors: ["Red".to_string()].into(),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &selection)), vec!["6"]);

    // A single-color card never matches, whatever the other facets say
    let single = create_test_card("x", "OP09-099", "Red", "Character", "3", "", "", "");
    let selection = FilterSelection {
        multicolor_only: true,
        colors: ["Red".to_string()].into(),
        types: [CardType::Character].into(),
        costs: [3].into(),
        ..Default::default()
    };
    assert!(!selection.matches(&single));
}

#[test]
fn test_numeric_facets_require_a_value() {
    let catalog = sample_catalog();

    let by_cost = FilterSelection {
        costs: [1, 5].into(),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &by_cost)), vec!["3", "4", "5"]);

    let by_power = FilterSelection {
        powers: [5000].into(),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &by_power)), vec!["1", "6"]);

    let by_counter = FilterSelection {
        counters: [1000, 2000].into(),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &by_counter)), vec!["2", "6"]);
}

#[test]
fn test_attribute_and_set_facets() {
    let catalog = sample_catalog();

    let by_attribute = FilterSelection {
        attributes: ["Slash".to_string(), "Wisdom".to_string()].into(),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &by_attribute)), vec!["2", "4"]);

    let by_set = FilterSelection {
        set: Some("OP01".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &by_set)), vec!["4"]);

    // Set comparison is exact
    let lowercase_set = FilterSelection {
        set: Some("op01".to_string()),
        ..Default::default()
    };
    assert!(apply_filters(&catalog, &lowercase_set).is_empty());
}

#[test]
fn test_blank_set_selects_all_sets() {
    let catalog = sample_catalog();

    for raw in [r#"{"set": ""}"#, r#"{"set": "   "}"#, r#"{"set": null}"#] {
        let selection: FilterSelection = serde_json::from_str(raw).unwrap();
        assert!(selection.is_empty());
        assert_eq!(apply_filters(&catalog, &selection), catalog);
    }

    // Blank set still combines with the other facets
    let selection: FilterSelection =
        serde_json::from_str(r#"{"set": "", "types": ["Character"]}"#).unwrap();
    assert_eq!(ids(&apply_filters(&catalog, &selection)), vec!["2", "4", "6"]);
}

#[test]
fn test_text_search_matches_any_field_case_insensitive() {
    let catalog = sample_catalog();

    let by_number = FilterSelection {
        query: "  st01-005 ".to_string(),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &by_number)), vec!["5"]);

    let by_attribute = FilterSelection {
        query: "WISDOM".to_string(),
        ..Default::default()
    };
    assert_eq!(ids(&apply_filters(&catalog, &by_attribute)), vec!["4"]);

    let whitespace = FilterSelection {
        query: "   ".to_string(),
        ..Default::default()
    };
    assert_eq!(apply_filters(&catalog, &whitespace).len(), catalog.len());
}

#[test]
fn test_owned_only_uses_annotation() {
    let mut catalog = sample_catalog();
    catalog[1].owned_quantity = Some(2);
    catalog[2].owned_quantity = Some(0);

    let selection = FilterSelection {
        owned_only: true,
        ..Default::default()
    };

    assert_eq!(ids(&apply_filters(&catalog, &selection)), vec!["2"]);
}
