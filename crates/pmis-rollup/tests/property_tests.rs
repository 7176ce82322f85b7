use pmis_hierarchy::HierarchyView;
use pmis_model::{Category, GoalId, NodeRef, ObjectiveId, Percent};
use pmis_rollup::{
    analyze_trend, classify_all, compute_counts, compute_node_percentage, filtered_summarize,
    recompute, summarize, DashboardFilters, EntityFilter, RollupConfig, Scope, TrendDirection,
};
use pmis_test_utils::{arb_kra_layout, arb_measurement, strategic_tree};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_percentages_stay_in_bounds(layout in arb_kra_layout()) {
        let tree = strategic_tree(&layout);
        for (node, value) in recompute(&tree).iter() {
            prop_assert!((0.0..=100.0).contains(&value.value()), "{node} = {value}");
        }
        let summary = summarize(&tree, &RollupConfig::default());
        prop_assert!((0.0..=100.0).contains(&summary.avg_performance.value()));
    }

    #[test]
    fn prop_trend_fields_in_bounds(raw in prop::collection::vec(-50.0f64..150.0, 1..30)) {
        let series: Vec<Percent> = raw.iter().copied().map(Percent::new).collect();
        let trend = analyze_trend(&series).unwrap();
        prop_assert_eq!(trend.data_points, series.len());
        prop_assert_eq!(Some(&trend.current), series.last());
        prop_assert!(trend.volatility >= 0.0);
        prop_assert!((0.0..=100.0).contains(&trend.average.value()));
        prop_assert!((0.0..=100.0).contains(&trend.confidence.value()));
        prop_assert_eq!(series.len() == 1, trend.direction == TrendDirection::InsufficientData);
    }

    #[test]
    fn prop_achievement_in_bounds(measurement in arb_measurement()) {
        let value = measurement.achievement().value();
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn prop_node_is_mean_of_children(layout in arb_kra_layout()) {
        let tree = strategic_tree(&layout);
        let objective = NodeRef::StrategicObjective(ObjectiveId(1));
        let kras = tree.children_of_type(objective, Category::Kra);
        for kra in &kras {
            let kpis = tree.children_of_type(*kra, Category::Kpi);
            let expected = if kpis.is_empty() {
                0.0
            } else {
                kpis.iter()
                    .map(|kpi| compute_node_percentage(&tree, *kpi).value())
                    .sum::<f64>() / kpis.len() as f64
            };
            prop_assert!((compute_node_percentage(&tree, *kra).value() - expected).abs() < 1e-6);
        }
        let expected = Percent::mean(kras.iter().map(|kra| compute_node_percentage(&tree, *kra)));
        prop_assert!((compute_node_percentage(&tree, objective).value() - expected.value()).abs() < 1e-6);
    }

    #[test]
    fn prop_classification_is_idempotent(layout in arb_kra_layout()) {
        let tree = strategic_tree(&layout);
        prop_assert_eq!(classify_all(&tree), classify_all(&tree));
    }

    #[test]
    fn prop_counts_match_records(layout in arb_kra_layout()) {
        let tree = strategic_tree(&layout);
        let counts = compute_counts(&tree, NodeRef::StrategicGoal(GoalId(1)));
        let kpis: usize = layout.iter().map(Vec::len).sum();
        prop_assert_eq!(counts[Category::Kra], layout.len());
        prop_assert_eq!(counts[Category::Kpi], kpis);
    }

    #[test]
    fn prop_missing_entity_summary_is_zero(layout in arb_kra_layout(), entity in 2u64..1000) {
        let tree = strategic_tree(&layout);
        let filters = DashboardFilters::new().with_scope(Scope::StrategicGoal, EntityFilter::Id(entity));
        let summary = filtered_summarize(&tree, filters, &RollupConfig::default());
        prop_assert_eq!(summary.avg_performance, Percent::ZERO);
        prop_assert!(summary.is_empty());
    }
}
