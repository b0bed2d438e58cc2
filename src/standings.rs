//! Season standings table
//!
//! Joins the three pipeline outputs of one season (race sessions, driver
//! roster, result rows) into the table a dashboard renders: one row per driver,
//! one column per race, plus a points total. Lookups are indexed once at
//! construction, so sorting a full season is a cheap in-memory operation.
//!
//! Column sorting follows the usual table-header behaviour: selecting the
//! current column again flips its direction, selecting a new column starts in
//! that column's natural direction.

use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::types::{Driver, DriverNumber, Session, SessionKey, SessionResult};

/// Column a [`Standings`] table can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SortColumn {
    FullName,
    TeamName,
    Points,
    /// Finishing position in one race
    Session(SessionKey),
}

impl SortColumn {
    /// Direction used when the column is first selected
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortColumn::Points => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// One rendered table row
#[derive(Debug, Clone)]
pub struct StandingsRow<'a> {
    pub driver: &'a Driver,
    pub total_points: f64,
    /// Result per race, aligned with [`Standings::sessions`]
    pub results: Vec<Option<&'a SessionResult>>,
}

/// Joined driver × race table for one season
#[derive(Debug, Clone)]
pub struct Standings {
    season: Option<u32>,
    drivers: Vec<Driver>,
    sessions: Vec<Session>,
    results: Vec<SessionResult>,
    totals: HashMap<DriverNumber, f64>,
    by_key: HashMap<(DriverNumber, SessionKey), usize>,
    column: SortColumn,
    direction: SortDirection,
}

impl Standings {
    /// Build the table and order it by points, highest first.
    pub fn new(drivers: Vec<Driver>, sessions: Vec<Session>, results: Vec<SessionResult>) -> Self {
        let mut totals: HashMap<DriverNumber, f64> = HashMap::new();
        let mut by_key = HashMap::with_capacity(results.len());

        for (index, row) in results.iter().enumerate() {
            *totals.entry(row.driver_number).or_default() += row.scoring_points();
            // Duplicate rows: the first one is the one shown
            by_key.entry((row.driver_number, row.session_key)).or_insert(index);
        }

        let mut standings = Self {
            season: None,
            drivers,
            sessions,
            results,
            totals,
            by_key,
            column: SortColumn::Points,
            direction: SortDirection::Descending,
        };
        standings.sort_with(SortColumn::Points, SortDirection::Descending);
        standings
    }

    /// Tag the table with the season it was built for.
    pub fn for_season(mut self, year: u32) -> Self {
        self.season = Some(year);
        self
    }

    pub fn season(&self) -> Option<u32> {
        self.season
    }

    /// Drivers in current display order
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    /// Race columns in pipeline order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    /// Result of `driver` in `session`, if one was recorded.
    pub fn result_for(&self, driver: DriverNumber, session: SessionKey) -> Option<&SessionResult> {
        self.by_key.get(&(driver, session)).map(|&index| &self.results[index])
    }

    /// Season points of `driver`; 0 when the driver scored nothing.
    pub fn total_points(&self, driver: DriverNumber) -> f64 {
        self.totals.get(&driver).copied().unwrap_or(0.0)
    }

    /// Current ordering
    pub fn sort_state(&self) -> (SortColumn, SortDirection) {
        (self.column, self.direction)
    }

    /// Order by `column`, flipping direction when it is already the sort column.
    pub fn sort_by(&mut self, column: SortColumn) {
        let direction = if column == self.column {
            self.direction.reversed()
        } else {
            column.default_direction()
        };
        self.sort_with(column, direction);
    }

    /// Order by `column` in a fixed direction.
    ///
    /// The sort is stable: drivers that compare equal keep their relative order.
    pub fn sort_with(&mut self, column: SortColumn, direction: SortDirection) {
        let mut drivers = std::mem::take(&mut self.drivers);
        drivers.sort_by(|a, b| direction.apply(self.compare(column, a, b)));
        self.drivers = drivers;
        self.column = column;
        self.direction = direction;
        debug!(?column, ?direction, drivers = self.drivers.len(), "Sorted standings");
    }

    /// Rows in display order
    pub fn rows(&self) -> impl Iterator<Item = StandingsRow<'_>> + '_ {
        self.drivers.iter().map(move |driver| StandingsRow {
            driver,
            total_points: self.total_points(driver.driver_number),
            results: self
                .sessions
                .iter()
                .map(|s| self.result_for(driver.driver_number, s.session_key))
                .collect(),
        })
    }

    fn compare(&self, column: SortColumn, a: &Driver, b: &Driver) -> Ordering {
        match column {
            SortColumn::FullName => a.full_name.cmp(&b.full_name),
            SortColumn::TeamName => a.team_name.cmp(&b.team_name),
            SortColumn::Points => self
                .total_points(a.driver_number)
                .total_cmp(&self.total_points(b.driver_number)),
            SortColumn::Session(session) => self
                .position_in(a.driver_number, session)
                .cmp(&self.position_in(b.driver_number, session)),
        }
    }

    /// Unclassified and absent drivers sort after every finisher.
    fn position_in(&self, driver: DriverNumber, session: SessionKey) -> u32 {
        self.result_for(driver, session).and_then(|r| r.position).unwrap_or(u32::MAX)
    }
}
