use crate::annunciator::{validate_range, AnnunciatorGroup, GroupError};
use arrayvec::ArrayString;
use core::cell::Cell;
use heapless::Vec;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Upper bound on System Annunciators per panel.
pub const MAX_GROUPS: usize = 16;
pub const MAX_GROUP_NAME_LEN: usize = 24;

// Both six-pack clusters must fit
const_assert!(MAX_GROUPS >= 12);

pub type GroupName = ArrayString<MAX_GROUP_NAME_LEN>;

// 737-NG six-pack, left cluster then right cluster, with sub-annunciator counts
const BOEING_737NG_SIX_PACK: [(&str, usize); 12] = [
    ("FLT CONT", 9),
    ("IRS", 6),
    ("FUEL", 5),
    ("ELEC", 6),
    ("APU", 4),
    ("OVHT/DET", 6),
    ("ANTI-ICE", 8),
    ("HYD", 4),
    ("DOORS", 10),
    ("ENG", 4),
    ("OVERHEAD", 8),
    ("AIR COND", 8),
];

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("layout parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("layout has {count} groups, at most {max} allowed")]
    TooManyGroups { count: usize, max: usize },
    #[error("group #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("group name '{name}' longer than {max} bytes")]
    NameTooLong { name: String, max: usize },
    #[error("duplicate group name '{0}'")]
    DuplicateName(String),
    #[error("group '{name}': {source}")]
    Group {
        name: String,
        #[source]
        source: GroupError,
    },
    #[error("unknown group '{0}'")]
    UnknownGroup(String),
    #[error("source has {actual} sub-annunciators, layout expects {expected}")]
    SourceLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub name: String,
    pub begin: usize,
    pub end: usize,
}

/// Which slice of the sub-annunciator array feeds each System Annunciator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub sub_annunciator_count: usize,
    pub groups: alloc::vec::Vec<GroupLayout>,
}

impl PanelLayout {
    pub fn boeing_737ng() -> Self {
        let mut groups = alloc::vec::Vec::with_capacity(BOEING_737NG_SIX_PACK.len());
        let mut begin = 0;

        for (name, count) in BOEING_737NG_SIX_PACK {
            groups.push(GroupLayout {
                name: name.to_string(),
                begin,
                end: begin + count,
            });
            begin += count;
        }

        Self {
            sub_annunciator_count: begin,
            groups,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, PanelError> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PanelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, PanelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every bound a [`Panel`] relies on, without needing a source.
    pub fn validate(&self) -> Result<(), PanelError> {
        if self.groups.len() > MAX_GROUPS {
            return Err(PanelError::TooManyGroups {
                count: self.groups.len(),
                max: MAX_GROUPS,
            });
        }

        for (index, group) in self.groups.iter().enumerate() {
            if group.name.is_empty() {
                return Err(PanelError::EmptyName { index });
            }
            if group.name.len() > MAX_GROUP_NAME_LEN {
                return Err(PanelError::NameTooLong {
                    name: group.name.clone(),
                    max: MAX_GROUP_NAME_LEN,
                });
            }
            if self.groups[..index].iter().any(|other| other.name == group.name) {
                return Err(PanelError::DuplicateName(group.name.clone()));
            }

            if let Err(source) = validate_range(group.begin, group.end, self.sub_annunciator_count) {
                return Err(PanelError::Group { name: group.name.clone(), source });
            }
        }

        Ok(())
    }

    /// A dark sub-annunciator array sized for this layout.
    pub fn allocate_source(&self) -> alloc::vec::Vec<Cell<bool>> {
        (0..self.sub_annunciator_count).map(|_| Cell::new(false)).collect()
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::boeing_737ng()
    }
}

#[derive(Debug)]
struct NamedGroup<'a> {
    name: GroupName,
    group: AnnunciatorGroup<'a, Cell<bool>>,
}

/// Glareshield host: one independent [`AnnunciatorGroup`] per SA, all reading
/// the same refreshable sub-annunciator array.
#[derive(Debug)]
pub struct Panel<'a> {
    groups: Vec<NamedGroup<'a>, MAX_GROUPS>,
}

impl<'a> Panel<'a> {
    pub fn new(layout: &PanelLayout, source: &'a [Cell<bool>]) -> Result<Self, PanelError> {
        layout.validate()?;

        if source.len() != layout.sub_annunciator_count {
            return Err(PanelError::SourceLength {
                expected: layout.sub_annunciator_count,
                actual: source.len(),
            });
        }

        let mut groups = Vec::new();
        for entry in &layout.groups {
            let group = AnnunciatorGroup::new(source, entry.begin, entry.end)
                .map_err(|err| PanelError::Group { name: entry.name.clone(), source: err })?;
            let name = GroupName::from(entry.name.as_str())
                .map_err(|_| PanelError::NameTooLong { name: entry.name.clone(), max: MAX_GROUP_NAME_LEN })?;

            groups
                .push(NamedGroup { name, group })
                .map_err(|_| PanelError::TooManyGroups { count: layout.groups.len(), max: MAX_GROUPS })?;
        }

        info!(groups = groups.len(), sub_annunciators = source.len(), "panel initialised");
        Ok(Self { groups })
    }

    /// Scans every group in layout order, returning each group's any-active
    /// result.
    pub fn scan(&mut self) -> Vec<(GroupName, bool), MAX_GROUPS> {
        self.groups
            .iter_mut()
            .map(|entry| (entry.name, entry.group.scan()))
            .collect()
    }

    pub fn lit_states(&mut self) -> Vec<(GroupName, bool), MAX_GROUPS> {
        self.groups
            .iter_mut()
            .map(|entry| (entry.name, entry.group.is_lit()))
            .collect()
    }

    /// RECALL: re-arms every group's acknowledgements.
    pub fn recall_all(&mut self) {
        debug!("recall all");
        for entry in &mut self.groups {
            entry.group.recall();
        }
    }

    /// RESET of a single SA, as when the crew pushes the lit annunciator.
    pub fn reset(&mut self, name: &str) -> Result<(), PanelError> {
        self.group_mut(name)
            .ok_or_else(|| PanelError::UnknownGroup(name.to_string()))?
            .reset();
        Ok(())
    }

    /// Master caution reset: extinguishes every SA.
    pub fn reset_all(&mut self) {
        debug!("reset all");
        for entry in &mut self.groups {
            entry.group.reset();
        }
    }

    pub fn lamp_test(&mut self, on: bool) {
        info!(on, "lamp test");
        for entry in &mut self.groups {
            entry.group.set_override(on);
        }
    }

    pub fn group(&self, name: &str) -> Option<&AnnunciatorGroup<'a, Cell<bool>>> {
        self.groups
            .iter()
            .find(|entry| entry.name.as_str() == name)
            .map(|entry| &entry.group)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut AnnunciatorGroup<'a, Cell<bool>>> {
        self.groups
            .iter_mut()
            .find(|entry| entry.name.as_str() == name)
            .map(|entry| &mut entry.group)
    }

    pub fn names(&self) -> Vec<GroupName, MAX_GROUPS> {
        self.groups.iter().map(|entry| entry.name).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boeing_layout_is_contiguous() {
        let layout = PanelLayout::boeing_737ng();
        assert_eq!(layout.groups.len(), 12);
        assert_eq!(layout.sub_annunciator_count, 78);
        assert!(layout.validate().is_ok());

        for pair in layout.groups.windows(2) {
            assert_eq!(pair[0].end, pair[1].begin);
        }
        assert_eq!(layout.groups[0].name, "FLT CONT");
        assert_eq!(layout.groups[11].name, "AIR COND");
    }

    #[test]
    fn test_validate_wraps_group_errors_with_name() {
        let layout = PanelLayout {
            sub_annunciator_count: 10,
            groups: vec![GroupLayout { name: "HYD".into(), begin: 6, end: 12 }],
        };
        match layout.validate() {
            Err(PanelError::Group { name, source }) => {
                assert_eq!(name, "HYD");
                assert_eq!(source, GroupError::OutOfBounds { end: 12, len: 10 });
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let layout = PanelLayout {
            sub_annunciator_count: 4,
            groups: vec![
                GroupLayout { name: "ENG".into(), begin: 0, end: 2 },
                GroupLayout { name: "ENG".into(), begin: 2, end: 4 },
            ],
        };
        assert!(matches!(layout.validate(), Err(PanelError::DuplicateName(name)) if name == "ENG"));
    }

    #[test]
    fn test_panel_requires_matching_source_length() {
        let layout = PanelLayout::boeing_737ng();
        let source: alloc::vec::Vec<Cell<bool>> = (0..10).map(|_| Cell::new(false)).collect();
        assert!(matches!(
            Panel::new(&layout, &source),
            Err(PanelError::SourceLength { expected: 78, actual: 10 })
        ));
    }
}
