//! Cycle phase, fertile window and pregnancy estimates from a single
//! last-period date.
//!
//! [`cycle::compute`] turns [`models::CycleParameters`] and a caller-supplied
//! `today` into a [`models::CycleReport`]; [`calendar::project`] lays that
//! report over a month as a [`models::MonthGrid`]. Both are pure. Persistence
//! lives behind [`storage::ParameterStore`] and is never touched by the
//! engine.

pub mod calendar;
pub mod crypto;
pub mod cycle;
pub mod dates;
pub mod models;
pub mod storage;

pub use calendar::{project, YearMonth};
pub use cycle::compute;
pub use models::{CycleParameters, CycleReport, DayCell, DayLabel, MonthGrid, Phase};
