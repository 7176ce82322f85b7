//! Testing utilities for PMIS workspace
//!
//! Shared fixtures, proptest strategies and assertions.

#![allow(missing_docs)]

use chrono::NaiveDate;
use pmis_hierarchy::{PerformanceTree, TreeBuilder};
use pmis_model::{
    DateWindow, Directorate, DirectorateId, Division, DivisionId, DivisionProgrammeLink,
    DivisionProgrammeLinkId, EdgeScores, GoalId, IndicatorAnchor, IndicatorId, Intervention,
    InterventionId, Kpi, KpiId, KpiType, Kra, KraId, KraParent, Measurement, NodeRef, ObjectiveId,
    Outcome, OutcomeId, Output, OutputId, Percent, PiapAction, PiapActionId, Programme,
    ProgrammeDirectorateLink, ProgrammeDirectorateLinkId, ProgrammeId, ProgrammeIndicator,
    ProgrammeObjective, ProgrammeObjectiveId, ScoreRecord, StrategicGoal, StrategicObjective,
};
use proptest::prelude::*;

pub fn m(target: f64, current: f64) -> Measurement {
    Measurement::new(target, current)
}

pub fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

pub fn window(start: &str, end: &str) -> DateWindow {
    DateWindow::between(day(start), day(end))
}

pub fn year_2024() -> DateWindow {
    window("2024-01-01", "2024-12-31")
}

#[track_caller]
pub fn assert_percent_eq(actual: Percent, expected: f64) {
    assert!(
        (actual.value() - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// KRA 1 with one KPI per `(target, current)` pair, ids from 1
pub fn kra_with_kpis(values: &[(f64, f64)]) -> TreeBuilder {
    let mut builder = TreeBuilder::new().kra(Kra::new(KraId(1), "Revenue", KraParent::Unlinked));
    for (index, (target, current)) in values.iter().enumerate() {
        let id = KpiId(index as u64 + 1);
        builder = builder.kpi(Kpi::new(id, format!("KPI {id}"), Some(KraId(1)), m(*target, *current)));
    }
    builder
}

/// Goal with two objectives, three KRAs, four KPIs, one fully built
/// programme implemented by two directorates and a division, all dated 2024
///
/// KPI 1 scores rise and KPI 3 scores fall over the last quarter of 2024.
pub fn sample_builder() -> TreeBuilder {
    let dated = year_2024();
    let mut builder = TreeBuilder::new();
    let dates = ["2024-10-05", "2024-11-01", "2024-11-25", "2024-12-20"];
    let scores = [
        (KpiId(1), [60.0, 70.0, 75.0, 80.0]),
        (KpiId(3), [35.0, 30.0, 25.0, 20.0]),
    ];
    for (kpi, values) in scores {
        for (date, value) in dates.into_iter().zip(values) {
            builder = builder.score(ScoreRecord::new(NodeRef::Kpi(kpi), day(date), value, value));
        }
    }
    builder
        .goal(StrategicGoal::new(GoalId(1), "Economic growth").with_window(dated))
        .objective(StrategicObjective::new(ObjectiveId(1), "Trade", Some(GoalId(1))).with_window(dated))
        .objective(
            StrategicObjective::new(ObjectiveId(2), "Investment", Some(GoalId(1))).with_window(dated),
        )
        .kra(Kra::new(KraId(1), "Exports", KraParent::Objective(ObjectiveId(1))))
        .kra(Kra::new(KraId(2), "Foreign direct investment", KraParent::Objective(ObjectiveId(2))))
        .kra(Kra::new(KraId(3), "Business climate", KraParent::Goal(GoalId(1))))
        .kpi(Kpi::new(KpiId(1), "Export value", Some(KraId(1)), m(100.0, 80.0)).with_window(dated))
        .kpi(Kpi::new(KpiId(2), "Export markets", Some(KraId(1)), m(50.0, 50.0)).with_window(dated))
        .kpi(Kpi::new(KpiId(3), "FDI inflow", Some(KraId(2)), m(10.0, 2.0)).with_window(dated))
        .kpi(
            Kpi::new(
                KpiId(4),
                "Days to register",
                Some(KraId(3)),
                m(5.0, 10.0).with_baseline(20.0).with_kind(KpiType::Decreasing),
            )
            .with_directorate(DirectorateId(1))
            .with_window(dated),
        )
        .directorate(Directorate::new(DirectorateId(1), "Planning"))
        .directorate(Directorate::new(DirectorateId(2), "Works"))
        .division(Division::new(DivisionId(1), "Roads", Some(DirectorateId(2))))
        .programme(
            Programme::new(ProgrammeId(1), "Infrastructure")
                .with_objective(ObjectiveId(1))
                .with_objective(ObjectiveId(2))
                .with_directorate(DirectorateId(1))
                .with_directorate(DirectorateId(2))
                .with_division(DivisionId(1))
                .with_window(dated),
        )
        .programme_directorate(ProgrammeDirectorateLink::new(
            ProgrammeDirectorateLinkId(1),
            ProgrammeId(1),
            DirectorateId(1),
            EdgeScores::with_performance(80.0),
        ))
        .division_programme(DivisionProgrammeLink::new(
            DivisionProgrammeLinkId(1),
            DivisionId(1),
            ProgrammeId(1),
            EdgeScores::with_performance(60.0),
        ))
        .programme_objective(ProgrammeObjective {
            id: ProgrammeObjectiveId(1),
            name: "Connected regions".into(),
            programme: ProgrammeId(1),
            active: true,
        })
        .outcome(Outcome {
            id: OutcomeId(1),
            name: "Lower travel time".into(),
            objective: ProgrammeObjectiveId(1),
            active: true,
        })
        .intervention(Intervention {
            id: InterventionId(1),
            name: "Road upgrades".into(),
            outcome: OutcomeId(1),
            active: true,
        })
        .output(Output {
            id: OutputId(1),
            name: "Paved roads".into(),
            intervention: InterventionId(1),
            active: true,
        })
        .piap_action(PiapAction::new(PiapActionId(1), "Tender works", OutputId(1), 50.0))
        .indicator(
            ProgrammeIndicator::new(
                IndicatorId(1),
                "Budget absorption",
                IndicatorAnchor::Programme(ProgrammeId(1)),
                m(100.0, 100.0),
            )
            .with_division(DivisionId(1))
            .with_window(dated),
        )
        .indicator(
            ProgrammeIndicator::new(
                IndicatorId(2),
                "Average trip time reduction",
                IndicatorAnchor::Outcome(OutcomeId(1)),
                m(10.0, 5.0),
            )
            .with_window(dated),
        )
        .indicator(
            ProgrammeIndicator::new(
                IndicatorId(3),
                "Km paved",
                IndicatorAnchor::Output(OutputId(1)),
                m(4.0, 3.0),
            )
            .with_division(DivisionId(1))
            .with_window(dated),
        )
}

pub fn sample_tree() -> PerformanceTree {
    sample_builder().build().unwrap()
}

/// Any measurement, including out-of-range and degenerate values
pub fn arb_measurement() -> impl Strategy<Value = Measurement> {
    let value = prop_oneof![
        8 => -50.0f64..500.0,
        1 => Just(0.0),
        1 => Just(f64::NAN),
    ];
    let kind = prop_oneof![
        Just(KpiType::Increasing),
        Just(KpiType::Decreasing),
        Just(KpiType::Target),
    ];
    (value.clone(), value.clone(), value, kind).prop_map(|(baseline, target, current, kind)| {
        Measurement::new(target, current)
            .with_baseline(baseline)
            .with_kind(kind)
    })
}

/// Goal 1 over objective 1, with one KRA per outer entry holding one KPI
/// per inner measurement
pub fn arb_kra_layout() -> impl Strategy<Value = Vec<Vec<Measurement>>> {
    prop::collection::vec(prop::collection::vec(arb_measurement(), 0..6), 0..5)
}

pub fn strategic_tree(layout: &[Vec<Measurement>]) -> PerformanceTree {
    let mut builder = TreeBuilder::new()
        .goal(StrategicGoal::new(GoalId(1), "Goal"))
        .objective(StrategicObjective::new(ObjectiveId(1), "Objective", Some(GoalId(1))));
    let mut next_kpi = 1;
    for (index, measurements) in layout.iter().enumerate() {
        let kra = KraId(index as u64 + 1);
        builder = builder.kra(Kra::new(kra, format!("KRA {kra}"), KraParent::Objective(ObjectiveId(1))));
        for measurement in measurements {
            builder = builder.kpi(Kpi::new(
                KpiId(next_kpi),
                format!("KPI {next_kpi}"),
                Some(kra),
                measurement.clone(),
            ));
            next_kpi += 1;
        }
    }
    builder.build().unwrap()
}
