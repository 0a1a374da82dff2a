//! # Glareshield System Annunciators
//!
//! Latching logic for the Boeing 737-NG glareshield System Annunciators (the
//! "six-pack"), with a panel host and a scenario replayer for driving it from
//! a simulator loop or a test script.
//!
//! ## Features
//!
//! - **Edge-triggered latching**: each sub-annunciator lights its SA once per activation
//! - **Crew controls**: RECALL re-arms acknowledgements, RESET extinguishes the SA
//! - **Lamp test**: forced-on override senior to the latched state
//! - **Bounded storage**: no heap allocations in the core, fail-fast range checks
//! - **Configurable panels**: JSON layouts with a built-in 737-NG default
//!
//! ## Quick Start
//!
//! ```rust
//! use glareshield::AnnunciatorGroup;
//!
//! let overhead = [false, true, false, false];
//! let mut sa = AnnunciatorGroup::new(&overhead, 0, 4).unwrap();
//!
//! assert!(sa.scan());
//! assert!(sa.is_lit());
//!
//! // Crew pushes the lit SA: it goes dark and stays dark
//! sa.reset();
//! sa.scan();
//! assert!(!sa.is_lit());
//!
//! // RECALL brings back every still-active sub-annunciator
//! sa.recall();
//! sa.scan();
//! assert!(sa.is_lit());
//! ```
//!
//! ## Architecture
//!
//! - [`annunciator`] - Per-SA acknowledgement and latch state machine
//! - [`panel`] - Panel layout configuration and the multi-SA host
//! - [`scenario`] - Frame-by-frame replay of sub-annunciator edges and crew actions

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

pub mod annunciator;
pub mod panel;
pub mod scenario;

// Re-export main public types for convenience
pub use annunciator::{AnnunciatorGroup, AnnunciatorState, GroupError, SubAnnunciator, MAX_SUBANNCS};
pub use panel::{GroupLayout, Panel, PanelError, PanelLayout};
pub use scenario::{CrewAction, Frame, FrameReport, Scenario, ScenarioError};
