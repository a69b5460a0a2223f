use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, info, warn};

use cycle_tracker::calendar::{project, YearMonth};
use cycle_tracker::cycle::compute;
use cycle_tracker::models::{CycleReport, TrackerData};
use cycle_tracker::storage::{FileStore, ParameterStore};

use crate::render;

/// Edits requested by `set`. `None` leaves a field unchanged.
#[derive(Debug, Default)]
pub struct ParamUpdate {
    pub last_period: Option<Option<NaiveDate>>,
    pub cycle_length: Option<u32>,
    pub period_length: Option<u32>,
    pub pregnancy_mode: Option<bool>,
}

/// One invocation's view of the store, the fallback record and the day
/// treated as today.
pub struct Session<'a> {
    store: &'a dyn ParameterStore,
    defaults: TrackerData,
    today: NaiveDate,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a dyn ParameterStore, defaults: TrackerData, today: NaiveDate) -> Self {
        Self {
            store,
            defaults,
            today,
        }
    }

    fn current(&self) -> Result<TrackerData> {
        let data = self
            .store
            .load()
            .context("failed to load tracker data")?
            .unwrap_or_else(|| self.defaults.clone());
        if let Err(e) = data.parameters().validate() {
            warn!(error = %e, "stored parameters are outside the usual range");
        }
        Ok(data)
    }

    fn report(&self, data: &TrackerData) -> CycleReport {
        let report = compute(&data.parameters(), self.today);
        debug!(today = %self.today, ?report, "report computed");
        report
    }

    pub fn set(&self, update: ParamUpdate) -> Result<TrackerData> {
        let mut data = self.current()?;
        if let Some(last_period) = update.last_period {
            data.last_period = last_period;
        }
        if let Some(len) = update.cycle_length {
            data.cycle_length = len;
        }
        if let Some(len) = update.period_length {
            data.period_length = len;
        }
        if let Some(mode) = update.pregnancy_mode {
            data.pregnancy_mode = mode;
        }

        data.parameters().validate()?;
        self.store.save(&data).context("failed to save tracker data")?;
        info!(
            last_period = ?data.last_period,
            cycle_length = data.cycle_length,
            period_length = data.period_length,
            "parameters updated"
        );
        Ok(data)
    }

    pub fn status(&self, out: &mut impl Write, force_pregnancy: bool, as_json: bool) -> Result<()> {
        let data = self.current()?;
        let report = self.report(&data);
        if as_json {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        } else {
            let pregnancy = (data.pregnancy_mode || force_pregnancy) && report.has_data();
            write!(out, "{}", render::status(&report, pregnancy))?;
        }
        Ok(())
    }

    pub fn calendar(&self, out: &mut impl Write, month: YearMonth, as_json: bool) -> Result<()> {
        let data = self.current()?;
        let report = self.report(&data);
        let grid = project(&report, month, self.today);
        match (grid, as_json) {
            (grid, true) => {
                serde_json::to_writer_pretty(&mut *out, &grid)?;
                writeln!(out)?;
            }
            (Some(grid), false) => write!(out, "{}", render::calendar(&grid))?,
            (None, false) => write!(out, "{}", render::no_calendar())?,
        }
        Ok(())
    }

    pub fn export(&self, out: &mut impl Write) -> Result<()> {
        let data = self.current()?;
        let report = self.report(&data);
        let doc = json!({ "data": data, "report": report });
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        Ok(())
    }

    /// Month selected by `calendar`: explicit, relative to today, or today's.
    pub fn month(&self, explicit: Option<YearMonth>, offset: Option<i32>) -> Result<YearMonth> {
        let current = YearMonth::containing(self.today);
        Ok(match (explicit, offset) {
            (Some(m), _) => m,
            (None, Some(n)) => current.offset(n)?,
            (None, None) => current,
        })
    }
}

pub fn reset(store: &FileStore, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("refusing to delete {} without --yes", store.path().display());
    }
    store.wipe().context("failed to delete tracker data")?;
    Ok(())
}
