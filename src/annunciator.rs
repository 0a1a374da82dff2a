use core::cell::Cell;
use core::ops::Range;
use heapless::Vec;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;
use tracing::debug;

/// Maximum sub-annunciators grouped under any one System Annunciator.
pub const MAX_SUBANNCS: usize = 12;

// Acknowledgement masks in snapshots are 16 bits wide
const_assert!(MAX_SUBANNCS > 0);
const_assert!(MAX_SUBANNCS <= 16);

/// One element of the host's sub-annunciator array.
///
/// Implemented for plain `bool` (a frozen frame) and for `Cell<bool>` so the
/// host can keep refreshing the array while groups hold a shared borrow.
pub trait SubAnnunciator {
    fn is_active(&self) -> bool;
}

impl SubAnnunciator for bool {
    fn is_active(&self) -> bool {
        *self
    }
}

impl SubAnnunciator for Cell<bool> {
    fn is_active(&self) -> bool {
        self.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("inverted sub-annunciator range {begin}..{end}")]
    InvertedRange { begin: usize, end: usize },
    #[error("group spans {count} sub-annunciators, at most {max} allowed")]
    TooManySubAnnunciators { count: usize, max: usize },
    #[error("range end {end} exceeds source length {len}")]
    OutOfBounds { end: usize, len: usize },
}

/// Checks a `[begin, end)` range against the group bounds and a source of
/// `len` sub-annunciators, returning the slot count.
pub fn validate_range(begin: usize, end: usize, len: usize) -> Result<usize, GroupError> {
    if end < begin {
        return Err(GroupError::InvertedRange { begin, end });
    }

    let count = end - begin;
    if count > MAX_SUBANNCS {
        return Err(GroupError::TooManySubAnnunciators {
            count,
            max: MAX_SUBANNCS,
        });
    }

    if end > len {
        return Err(GroupError::OutOfBounds { end, len });
    }

    Ok(count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnunciatorState {
    Dark,
    /// A fresh activation was scanned but not yet observed by `is_lit`.
    Pending,
    Lit,
    Overridden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub begin: usize,
    pub end: usize,
    pub state: AnnunciatorState,
    pub acknowledged_mask: u16,
    pub pending_light: bool,
    pub latched_lit: bool,
    pub override_lit: bool,
}

/// Latching logic for a single System Annunciator on the glareshield.
///
/// The group reads `source[begin..end]` once per cycle in [`scan`]. A
/// sub-annunciator that turns on lights the SA exactly once; it is then
/// acknowledged and cannot relight the SA until it goes dark again or the
/// crew presses RECALL. RESET extinguishes the SA without touching the
/// acknowledgements.
///
/// [`scan`]: AnnunciatorGroup::scan
#[derive(Debug)]
pub struct AnnunciatorGroup<'a, T: SubAnnunciator = bool> {
    source: &'a [T],
    begin: usize,
    end: usize,
    acknowledged: Vec<bool, MAX_SUBANNCS>,
    pending_light: bool,
    latched_lit: bool,
    override_lit: bool,
}

impl<'a, T: SubAnnunciator> AnnunciatorGroup<'a, T> {
    /// Binds a group to `source[begin..end]`.
    ///
    /// The range is rejected rather than clamped: clamping would shift the
    /// local slot indices away from the intended sub-annunciators.
    pub fn new(source: &'a [T], begin: usize, end: usize) -> Result<Self, GroupError> {
        let count = validate_range(begin, end, source.len())?;

        let acknowledged = core::iter::repeat(false).take(count).collect();

        Ok(Self {
            source,
            begin,
            end,
            acknowledged,
            pending_light: false,
            latched_lit: false,
            override_lit: false,
        })
    }

    pub fn from_range(source: &'a [T], range: Range<usize>) -> Result<Self, GroupError> {
        Self::new(source, range.start, range.end)
    }

    /// Checks every sub-annunciator in the group and returns whether any is
    /// currently active.
    ///
    /// Must run once per cycle before [`is_lit`](Self::is_lit); it is the
    /// only place new lighting evidence comes from.
    pub fn scan(&mut self) -> bool {
        let source = self.source;
        let mut active_found = false;

        for (slot, acked) in source[self.begin..self.end]
            .iter()
            .zip(self.acknowledged.iter_mut())
        {
            if slot.is_active() {
                active_found = true;
                if !*acked {
                    *acked = true;
                    self.pending_light = true;
                }
            } else {
                *acked = false;
            }
        }

        active_found
    }

    /// Returns true if the SA should be illuminated.
    ///
    /// Pending evidence from `scan` is folded into the latched state here.
    /// `pending_light` stays set until `reset`.
    pub fn is_lit(&mut self) -> bool {
        if self.pending_light && !self.latched_lit {
            debug!(begin = self.begin, end = self.end, "system annunciator latched on");
        }
        if self.pending_light {
            self.latched_lit = true;
        }
        if self.override_lit {
            return true;
        }
        self.latched_lit
    }

    /// Clears every acknowledgement so active sub-annunciators relight the SA
    /// on the next `scan`.
    pub fn recall(&mut self) {
        debug!(begin = self.begin, end = self.end, "recall");
        self.acknowledged.iter_mut().for_each(|acked| *acked = false);
    }

    /// Extinguishes the SA. Sub-annunciators that are still active and
    /// already acknowledged will not relight it.
    pub fn reset(&mut self) {
        debug!(begin = self.begin, end = self.end, "reset");
        self.latched_lit = false;
        self.pending_light = false;
    }

    /// Lamp test override.
    pub fn set_override(&mut self, lit: bool) {
        if self.override_lit != lit {
            debug!(begin = self.begin, end = self.end, lit, "override changed");
        }
        self.override_lit = lit;
    }

    pub fn state(&self) -> AnnunciatorState {
        if self.override_lit {
            AnnunciatorState::Overridden
        } else if self.latched_lit {
            AnnunciatorState::Lit
        } else if self.pending_light {
            AnnunciatorState::Pending
        } else {
            AnnunciatorState::Dark
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.begin..self.end
    }

    pub fn acknowledged(&self) -> &[bool] {
        &self.acknowledged
    }

    pub fn is_overridden(&self) -> bool {
        self.override_lit
    }

    pub fn snapshot(&self) -> GroupSnapshot {
        let acknowledged_mask = self
            .acknowledged
            .iter()
            .enumerate()
            .filter(|(_, acked)| **acked)
            .fold(0u16, |mask, (slot, _)| mask | (1 << slot));

        GroupSnapshot {
            begin: self.begin,
            end: self.end,
            state: self.state(),
            acknowledged_mask,
            pending_light: self.pending_light,
            latched_lit: self.latched_lit,
            override_lit: self.override_lit,
        }
    }
}
