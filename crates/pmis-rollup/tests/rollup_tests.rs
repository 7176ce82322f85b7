use pmis_hierarchy::{HierarchyView, TreeBuilder};
use pmis_model::{
    Category, Directorate, DirectorateId, Division, DivisionId, DivisionProgrammeLink,
    DivisionProgrammeLinkId, EdgeScores, GoalId, IndicatorAnchor, IndicatorId, KpiId, NodeRef,
    ObjectiveId, Percent, PerformanceBand, Programme, ProgrammeDirectorateLink,
    ProgrammeDirectorateLinkId, ProgrammeId, ProgrammeIndicator, StrategicGoal,
    StrategicObjective,
};
use pmis_rollup::{
    build_analytics, build_dashboard, classify_all, compute_counts, compute_node_percentage,
    filtered_summarize, recompute, summarize, AlertSeverity, BandFilter, DashboardFilters,
    DataType, EntityFilter, PeriodFilter, RiskLevel, RollupConfig, Scope, TrendDirection,
};
use pmis_test_utils::{assert_percent_eq, day, kra_with_kpis, m, sample_tree};
use pretty_assertions::assert_eq;

#[test]
fn test_kra_is_mean_of_two_kpis() {
    let tree = kra_with_kpis(&[(100.0, 80.0), (100.0, 40.0)]).build().unwrap();
    assert_percent_eq(compute_node_percentage(&tree, NodeRef::Kra(pmis_model::KraId(1))), 60.0);
}

#[test]
fn test_goal_with_empty_objective_reads_zero() {
    let tree = TreeBuilder::new()
        .goal(StrategicGoal::new(GoalId(1), "Growth"))
        .objective(StrategicObjective::new(ObjectiveId(1), "Trade", Some(GoalId(1))))
        .build()
        .unwrap();
    assert_eq!(compute_node_percentage(&tree, NodeRef::StrategicGoal(GoalId(1))), Percent::ZERO);
    assert_eq!(
        compute_node_percentage(&tree, NodeRef::StrategicObjective(ObjectiveId(1))),
        Percent::ZERO
    );
}

#[test]
fn test_edge_score_is_clamped_in_rollup() {
    let tree = TreeBuilder::new()
        .directorate(Directorate::new(DirectorateId(1), "Works"))
        .programme(Programme::new(ProgrammeId(1), "Roads"))
        .programme_directorate(ProgrammeDirectorateLink::new(
            ProgrammeDirectorateLinkId(1),
            ProgrammeId(1),
            DirectorateId(1),
            EdgeScores::with_performance(115.0),
        ))
        .build()
        .unwrap();
    let link = NodeRef::ProgrammeDirectorateLink(ProgrammeDirectorateLinkId(1));
    assert_eq!(compute_node_percentage(&tree, link), Percent::FULL);
    assert_eq!(
        compute_node_percentage(&tree, NodeRef::Directorate(DirectorateId(1))),
        Percent::FULL
    );
}

#[test]
fn test_period_matching_nothing_gives_zero_summary() {
    let tree = sample_tree();
    let filters = DashboardFilters::new().with_period("fy:2030-2031".parse().unwrap());
    let summary = filtered_summarize(&tree, filters, &RollupConfig::default());
    assert_eq!(summary.avg_performance, Percent::ZERO);
    assert_eq!(summary.indicator_count, 0);
    assert_eq!(summary.count(Category::Kpi), 0);
    assert_eq!(summary.average(Category::Kra), Percent::ZERO);
    assert_eq!(summary.distribution.banded(), 0);
}

#[test]
fn test_filters_matching_nothing_never_fail() {
    let tree = sample_tree();
    let config = RollupConfig::default();
    let cases = [
        DashboardFilters::new().with_scope(Scope::Programme, EntityFilter::Id(404)),
        DashboardFilters::new().with_performance(BandFilter::Band(PerformanceBand::Excellent))
            .with_data_type(DataType::Category(Category::PiapAction))
            .with_period(PeriodFilter::Range("1990-01-01..1990-12-31".parse().unwrap())),
    ];
    for filters in cases {
        let summary = filtered_summarize(&tree, filters, &config);
        assert_eq!(summary.avg_performance, Percent::ZERO);
        assert_eq!(summary.distribution.banded(), 0);
        let report = build_dashboard(&tree, filters, &config);
        assert!(report.top_indicators.is_empty());
    }
}

#[test]
fn test_division_counts_programme_once() {
    let tree = TreeBuilder::new()
        .directorate(Directorate::new(DirectorateId(1), "Works"))
        .directorate(Directorate::new(DirectorateId(2), "Transport"))
        .division(Division::new(DivisionId(1), "Roads", Some(DirectorateId(1))))
        .programme(
            Programme::new(ProgrammeId(1), "A")
                .with_directorate(DirectorateId(1))
                .with_directorate(DirectorateId(2))
                .with_division(DivisionId(1)),
        )
        .division_programme(DivisionProgrammeLink::new(
            DivisionProgrammeLinkId(1),
            DivisionId(1),
            ProgrammeId(1),
            EdgeScores::default(),
        ))
        .indicator(
            ProgrammeIndicator::new(
                IndicatorId(1),
                "Km paved",
                IndicatorAnchor::Programme(ProgrammeId(1)),
                m(10.0, 5.0),
            )
            .with_division(DivisionId(1)),
        )
        .build()
        .unwrap();

    let division = compute_counts(&tree, NodeRef::Division(DivisionId(1)));
    assert_eq!(division[Category::Programme], 1);
    assert_eq!(division[Category::ProgrammeIndicator], 1);
    assert_eq!(division[Category::Directorate], 0);

    let directorate = compute_counts(&tree, NodeRef::Directorate(DirectorateId(1)));
    assert_eq!(directorate[Category::Programme], 1);
    assert_eq!(directorate[Category::Division], 1);
}

#[test]
fn test_goal_counts_shared_programme_once() {
    let counts = compute_counts(&sample_tree(), NodeRef::StrategicGoal(GoalId(1)));
    assert_eq!(counts[Category::StrategicObjective], 2);
    assert_eq!(counts[Category::Kra], 3);
    assert_eq!(counts[Category::Kpi], 4);
    assert_eq!(counts[Category::Programme], 1);
    assert_eq!(counts[Category::ProgrammeIndicator], 3);
    assert_eq!(counts[Category::Directorate], 2);
    assert_eq!(counts[Category::Division], 1);
    assert_eq!(counts[Category::PiapAction], 1);
}

#[test]
fn test_overachievement_is_clamped() {
    let tree = kra_with_kpis(&[(100.0, 150.0)]).build().unwrap();
    assert_eq!(compute_node_percentage(&tree, NodeRef::Kpi(KpiId(1))), Percent::FULL);
}

#[test]
fn test_sample_rollup_values() {
    let tree = sample_tree();
    let table = recompute(&tree);
    assert_percent_eq(table.get(NodeRef::StrategicGoal(GoalId(1))), (90.0 + 20.0 + 200.0 / 3.0) / 3.0);
    assert_percent_eq(table.get(NodeRef::Programme(ProgrammeId(1))), 78.125);
    assert_percent_eq(table.get(NodeRef::Directorate(DirectorateId(1))), (200.0 / 3.0 + 80.0) / 2.0);
    assert_percent_eq(table.get(NodeRef::Division(DivisionId(1))), (100.0 + 75.0 + 60.0) / 3.0);

    for (node, value) in table.iter() {
        assert_eq!(value, compute_node_percentage(&tree, node), "{node}");
    }
}

#[test]
fn test_sample_summary() {
    let summary = summarize(&sample_tree(), &RollupConfig::default());
    assert_eq!(summary.indicator_count, 7);
    assert_percent_eq(summary.avg_performance, (80.0 + 100.0 + 20.0 + 200.0 / 3.0 + 100.0 + 50.0 + 75.0) / 7.0);
    assert_eq!(summary.distribution.excellent, 2);
    assert_eq!(summary.distribution.good, 2);
    assert_eq!(summary.distribution.fair, 2);
    assert_eq!(summary.distribution.poor, 1);
    assert_eq!(summary.count(Category::ProgrammeDirectorateLink), 1);
}

#[test]
fn test_scope_restricts_summary_to_subtree() {
    let tree = sample_tree();
    let filters = DashboardFilters::new().with_scope(Scope::StrategicObjective, EntityFilter::Id(1));
    let summary = filtered_summarize(&tree, filters, &RollupConfig::default());
    assert_eq!(summary.count(Category::Kpi), 2);
    assert_eq!(summary.count(Category::Kra), 1);
    assert_eq!(summary.count(Category::StrategicGoal), 0);
    assert_eq!(summary.count(Category::Programme), 1);
}

#[test]
fn test_strategic_data_type_drops_programme_indicators() {
    let tree = sample_tree();
    let filters = DashboardFilters::new().with_data_type(DataType::Strategic);
    let summary = filtered_summarize(&tree, filters, &RollupConfig::default());
    assert_eq!(summary.indicator_count, 4);
    assert_eq!(summary.count(Category::ProgrammeIndicator), 0);
}

#[test]
fn test_filters_from_request_json() {
    let tree = sample_tree();
    let filters = DashboardFilters::from_json(&serde_json::json!({
        "period": "fy:2024-2025",
        "performance": "excellent",
        "page": 2
    }));
    let view = pmis_rollup::FilteredView::new(&tree, filters, &RollupConfig::default());
    assert_eq!(
        view.nodes_of(Category::Kpi),
        vec![NodeRef::Kpi(KpiId(2))]
    );
}

#[test]
fn test_classification_is_idempotent() {
    let tree = sample_tree();
    let first = classify_all(&tree);
    let second = classify_all(&tree);
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_sample_analytics() {
    let tree = sample_tree();
    let report = build_analytics(&tree, DashboardFilters::new(), day("2024-12-31"), &RollupConfig::default());

    let trends: Vec<(NodeRef, TrendDirection, RiskLevel)> = report
        .trends
        .iter()
        .map(|t| (t.node, t.analysis.direction, t.analysis.risk_level))
        .collect();
    assert_eq!(
        trends,
        vec![
            (NodeRef::Kpi(KpiId(1)), TrendDirection::Improving, RiskLevel::Low),
            (NodeRef::Kpi(KpiId(3)), TrendDirection::Declining, RiskLevel::High),
        ]
    );
    assert_percent_eq(report.trends[1].analysis.average, 27.5);

    assert_eq!(report.risk.total_kpis, 4);
    assert_eq!(report.risk.at_risk, vec![NodeRef::Kpi(KpiId(3)), NodeRef::Kpi(KpiId(4))]);
    assert_eq!(report.risk.risk_level, RiskLevel::Critical);
    assert_eq!(
        report.risk.by_directorate.get(&NodeRef::Directorate(DirectorateId(1))),
        Some(&vec![NodeRef::Kpi(KpiId(4))])
    );

    let alerts: Vec<(NodeRef, AlertSeverity)> =
        report.alerts.iter().map(|a| (a.node, a.severity)).collect();
    assert_eq!(
        alerts,
        vec![
            (NodeRef::Kpi(KpiId(3)), AlertSeverity::Critical),
            (NodeRef::Kpi(KpiId(4)), AlertSeverity::Warning),
        ]
    );
}

#[test]
fn test_analytics_follow_scope() {
    let tree = sample_tree();
    let filters = DashboardFilters::new().with_scope(Scope::Directorate, EntityFilter::Id(1));
    let report = build_analytics(&tree, filters, day("2024-12-31"), &RollupConfig::default());
    assert!(report.trends.is_empty());
    assert_eq!(report.risk.total_kpis, 1);
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].node, NodeRef::Kpi(KpiId(4)));
}

#[test]
fn test_old_scores_fall_outside_trend_window() {
    let tree = sample_tree();
    let report = build_analytics(&tree, DashboardFilters::new(), day("2025-06-30"), &RollupConfig::default());
    assert!(report.trends.is_empty());
}
