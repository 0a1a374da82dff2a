use glareshield::*;
use glareshield::scenario::{self, GroupReport};

const RECALL_RESET: &str = include_str!("../demos/recall_reset.json");
const ENGINE_START: &str = include_str!("../demos/engine_start.json");

fn hyd(report: &FrameReport) -> &GroupReport {
    report.group("HYD").unwrap()
}

#[test]
fn test_recall_reset_demo_replay() {
    let scenario = Scenario::from_json(RECALL_RESET).unwrap();
    let reports = scenario::run(&scenario, &PanelLayout::default()).unwrap();
    assert_eq!(reports.len(), 8);

    let observed: Vec<(bool, bool, AnnunciatorState)> = reports
        .iter()
        .map(|report| {
            let group = hyd(report);
            (group.active, group.lit, group.state)
        })
        .collect();

    assert_eq!(
        observed,
        vec![
            (false, false, AnnunciatorState::Dark),
            (true, true, AnnunciatorState::Lit),
            // Reset while still active: acknowledged, stays dark
            (true, false, AnnunciatorState::Dark),
            (true, false, AnnunciatorState::Dark),
            // Recall re-arms and the next scan relights
            (true, true, AnnunciatorState::Lit),
            (false, true, AnnunciatorState::Lit),
            (false, true, AnnunciatorState::Overridden),
            (false, false, AnnunciatorState::Dark),
        ]
    );
}

#[test]
fn test_engine_start_on_default_layout() {
    let scenario = Scenario::from_json(ENGINE_START).unwrap();
    assert!(scenario.layout.is_none());

    let reports = scenario::run(&scenario, &PanelLayout::boeing_737ng()).unwrap();
    let lit_counts: Vec<usize> = reports.iter().map(FrameReport::lit_count).collect();
    assert_eq!(lit_counts, vec![12, 0, 3, 0, 0, 1, 0, 0]);

    let relit = &reports[5];
    assert!(relit.group("ANTI-ICE").unwrap().lit);
    assert!(!relit.group("HYD").unwrap().lit);
    assert!(relit.group("HYD").unwrap().active);
    assert!(relit.group("OVERHEAD").unwrap().active);
}

#[test]
fn test_step_drives_a_live_panel() {
    let layout = PanelLayout::boeing_737ng();
    let source = layout.allocate_source();
    let mut panel = Panel::new(&layout, &source).unwrap();

    let frame = Frame { set: vec![26], ..Frame::default() };
    let report = scenario::step(&source, &mut panel, 0, &frame).unwrap();
    assert_eq!(report.frame, 0);
    assert_eq!(report.groups.len(), 12);
    assert!(report.group("APU").unwrap().lit);
    assert_eq!(report.lit_count(), 1);

    // Host-side refresh between frames is visible to the next step
    source[26].set(false);
    let report = scenario::step(&source, &mut panel, 1, &Frame::default()).unwrap();
    assert!(!report.group("APU").unwrap().active);
    assert!(report.group("APU").unwrap().lit);
}

#[test]
fn test_embedded_layout_is_validated() {
    let json = r#"{
        "layout": { "sub_annunciator_count": 2, "groups": [{ "name": "IRS", "begin": 0, "end": 3 }] },
        "frames": []
    }"#;
    assert!(matches!(
        Scenario::from_json(json),
        Err(ScenarioError::Panel(PanelError::Group { .. }))
    ));
}

#[test]
fn test_report_serializes_to_json() {
    let scenario = Scenario::from_json(RECALL_RESET).unwrap();
    let reports = scenario::run(&scenario, &PanelLayout::default()).unwrap();

    let json = serde_json::to_string(&reports[1]).unwrap();
    let parsed: FrameReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, reports[1]);
    assert!(json.contains("\"name\":\"HYD\""));
}
