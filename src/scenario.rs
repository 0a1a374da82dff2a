//! Frame-by-frame replay of sub-annunciator edges and crew actions.
//!
//! Each frame is applied in the order a simulator tick would see it: the
//! host refreshes the sub-annunciator array, crew button presses are
//! handled, every group is scanned, then the glareshield is rendered.

use crate::annunciator::AnnunciatorState;
use crate::panel::{Panel, PanelError, PanelLayout};
use core::cell::Cell;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scenario I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error("frame {frame}: sub-annunciator {index} outside source of {len}")]
    IndexOutOfRange { frame: usize, index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CrewAction {
    Recall,
    Reset { group: String },
    ResetAll,
    LampTest { on: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub set: Vec<usize>,
    #[serde(default)]
    pub clear: Vec<usize>,
    #[serde(default)]
    pub actions: Vec<CrewAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub layout: Option<PanelLayout>,
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub active: bool,
    pub lit: bool,
    pub state: AnnunciatorState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: usize,
    pub groups: Vec<GroupReport>,
}

impl FrameReport {
    pub fn group(&self, name: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|report| report.name == name)
    }

    pub fn lit_count(&self) -> usize {
        self.groups.iter().filter(|report| report.lit).count()
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json)?;
        if let Some(layout) = &scenario.layout {
            layout.validate()?;
        }
        Ok(scenario)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The embedded layout, or `fallback` when the scenario carries none.
    pub fn layout_or<'s>(&'s self, fallback: &'s PanelLayout) -> &'s PanelLayout {
        self.layout.as_ref().unwrap_or(fallback)
    }
}

/// Applies one frame to `panel`, whose groups must borrow `source`.
pub fn step(
    source: &[Cell<bool>],
    panel: &mut Panel<'_>,
    index: usize,
    frame: &Frame,
) -> Result<FrameReport, ScenarioError> {
    for (&slot, active) in frame
        .set
        .iter()
        .map(|slot| (slot, true))
        .chain(frame.clear.iter().map(|slot| (slot, false)))
    {
        let cell = source.get(slot).ok_or(ScenarioError::IndexOutOfRange {
            frame: index,
            index: slot,
            len: source.len(),
        })?;
        cell.set(active);
    }

    for action in &frame.actions {
        trace!(frame = index, ?action, "crew action");
        match action {
            CrewAction::Recall => panel.recall_all(),
            CrewAction::Reset { group } => panel.reset(group)?,
            CrewAction::ResetAll => panel.reset_all(),
            CrewAction::LampTest { on } => panel.lamp_test(*on),
        }
    }

    let active = panel.scan();
    let lit = panel.lit_states();

    let groups = active
        .iter()
        .zip(lit.iter())
        .map(|((name, active), (_, lit))| {
            let state = panel
                .group(name.as_str())
                .map_or(AnnunciatorState::Dark, |group| group.state());
            GroupReport {
                name: name.to_string(),
                active: *active,
                lit: *lit,
                state,
            }
        })
        .collect();

    trace!(frame = index, "frame applied");
    Ok(FrameReport { frame: index, groups })
}

/// Replays every frame against a fresh, dark panel.
pub fn run(scenario: &Scenario, fallback: &PanelLayout) -> Result<Vec<FrameReport>, ScenarioError> {
    let layout = scenario.layout_or(fallback);
    let source = layout.allocate_source();
    let mut panel = Panel::new(layout, &source)?;

    scenario
        .frames
        .iter()
        .enumerate()
        .map(|(index, frame)| step(&source, &mut panel, index, frame))
        .collect()
}
