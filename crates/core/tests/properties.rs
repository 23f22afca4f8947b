// Property-based tests for config assembly and the row/category editors.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test -p reconmap-core

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use reconmap_core::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 30)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Column name: usually set, sometimes empty.
fn arb_column() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-z_]{1,8}",
        1 => Just(String::new()),
    ]
}

fn arb_mapping() -> impl Strategy<Value = ColumnMapping> {
    (arb_column(), arb_column(), any::<bool>(), any::<bool>()).prop_map(|(a, b, join, recon)| {
        ColumnMapping::new(a, b).join_key(join).recon_key(recon)
    })
}

fn arb_source() -> impl Strategy<Value = Option<Source>> {
    prop_oneof![
        2 => Just(Some(Source::Source1)),
        2 => Just(Some(Source::Source2)),
        1 => Just(None),
    ]
}

fn arb_operator() -> impl Strategy<Value = Option<FilterOperator>> {
    prop_oneof![
        4 => proptest::sample::select(FilterOperator::ALL.to_vec()).prop_map(Some),
        1 => Just(None),
    ]
}

fn arb_filter() -> impl Strategy<Value = FilterDraft> {
    (arb_source(), arb_column(), arb_operator(), arb_column()).prop_map(
        |(source, column, operator, value)| FilterDraft {
            source,
            column,
            operator,
            value,
        },
    )
}

fn arb_journey() -> impl Strategy<Value = JourneyConfig> {
    (
        r"[A-Za-z ]{0,12}",
        proptest::collection::vec((r"[A-Za-z]{0,5}", proptest::collection::vec(r"[a-z]{0,4}", 0..4)), 0..6),
    )
        .prop_map(|(name, cats)| {
            let mut journey = JourneyConfig::new(name);
            for (cat, subs) in cats {
                journey.categories.add_category(&cat);
                for sub in subs {
                    journey.categories.add_subcategory(&cat, &sub);
                }
            }
            journey
        })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn mappings_keep_exactly_complete_entries(mappings in proptest::collection::vec(arb_mapping(), 0..12)) {
        let config = assemble(&JourneyConfig::default(), &mappings, &[], noon());
        let expected: Vec<ColumnMapping> = mappings
            .iter()
            .filter(|m| !m.source1_column.is_empty() && !m.source2_column.is_empty())
            .cloned()
            .collect();
        prop_assert_eq!(config.mappings, expected);
    }

    #[test]
    fn filters_keep_exactly_complete_entries(filters in proptest::collection::vec(arb_filter(), 0..12)) {
        let config = assemble(&JourneyConfig::default(), &[], &filters, noon());
        let expected: Vec<FilterCondition> = filters
            .iter()
            .filter(|f| f.source.is_some() && f.operator.is_some() && !f.column.is_empty() && !f.value.is_empty())
            .map(|f| FilterCondition::new(f.source.unwrap(), f.column.clone(), f.operator.unwrap(), f.value.clone()))
            .collect();
        prop_assert_eq!(config.filters, expected);
    }

    #[test]
    fn assembled_config_survives_json(
        journey in arb_journey(),
        mappings in proptest::collection::vec(arb_mapping(), 0..8),
        filters in proptest::collection::vec(arb_filter(), 0..8),
    ) {
        let config = assemble(&journey, &mappings, &filters, noon());
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: ReconciliationConfig = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, config);
    }

    #[test]
    fn add_category_twice_is_single_entry(name in r"[A-Za-z]{1,10}") {
        let mut once = CategorySet::new();
        once.add_category(&name);
        let mut twice = once.clone();
        prop_assert!(!twice.add_category(&name));
        prop_assert_eq!(&twice, &once);
        prop_assert!(twice.get(&name).unwrap().subcategories.is_empty());
    }

    #[test]
    fn batch_removal_order_is_irrelevant(
        len in 1usize..10,
        picks in proptest::collection::vec(0usize..12, 0..6),
    ) {
        let mut forward: RowList<usize> = (0..len).collect();
        let mut reversed = forward.clone();

        let mut rev_picks = picks.clone();
        rev_picks.reverse();

        let removed = forward.remove_at(&picks);
        reversed.remove_at(&rev_picks);
        prop_assert_eq!(&forward, &reversed);

        // Exactly the picked in-range originals are gone.
        let survivors: Vec<usize> = forward.values().copied().collect();
        let expected: Vec<usize> = (0..len).filter(|i| !picks.contains(i)).collect();
        prop_assert_eq!(survivors, expected);
        prop_assert_eq!(removed.len() + forward.len(), len);
    }
}

// ---------------------------------------------------------------------------
// Worked examples
// ---------------------------------------------------------------------------

#[test]
fn remove_indices_two_and_zero_from_three() {
    let mut list: RowList<&str> = ["first", "second", "third"].into_iter().collect();
    let removed = list.remove_at(&[2, 0]);
    assert_eq!(removed, vec!["first", "third"]);
    assert_eq!(list.values().copied().collect::<Vec<_>>(), vec!["second"]);
}

#[test]
fn form_round_trip_through_assembly() {
    let mut form = FormState::new();
    form.journey.journey_name = "Merchant payouts".into();
    form.journey.categories.add_category("Settlements");
    form.journey.categories.add_subcategory("Settlements", "Daily");

    let keep = form.mappings.push(ColumnMapping::new("a", "x").join_key(true));
    let drop = form.mappings.push(ColumnMapping::new("", "y"));
    form.mappings.push(ColumnMapping::new("b", "z").recon_key(true));
    form.filters.push(FilterCondition::new(Source::Source1, "amt", FilterOperator::Equals, "100").into());

    // Dropping the incomplete row by id changes nothing in the output.
    let before = form.assemble(noon());
    form.remove_mappings(&[drop]).unwrap();
    let after = form.assemble(noon());
    assert_eq!(before, after);

    assert_eq!(after.mappings[0], *form.mappings.get(keep).unwrap());
    assert_eq!(after.filters.len(), 1);
    assert_eq!(after.timestamp, "2025-06-30 12:00:00");
}
