use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use foundation::{Clock, GeoExtent, SystemClock, format_iso8601, parse_iso8601};
use tracing::debug;

use crate::display::{DisplayError, DisplayOp, MapDisplay};
use crate::leading::{leading_extent, supports_leading_edge};
use crate::report::{ErrorReporter, TracingReporter};
use crate::state::ParsedState;

/// Message reported when an update is abandoned.
pub const UPDATE_FAILED: &str = "Unable to update map";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("{op} failed: {source}")]
    Display {
        op: DisplayOp,
        #[source]
        source: DisplayError,
    },
}

impl ReconcileError {
    fn from_display(op: DisplayOp) -> impl FnOnce(DisplayError) -> Self {
        move |source| ReconcileError::Display { op, source }
    }
}

/// What one successful reconcile pushed to the display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Projection applied, after fallback to the default.
    pub projection: Option<String>,
    pub layers: bool,
    pub day: Option<DateTime<Utc>>,
    pub palettes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Same serialized state as last time for this projection.
    Unchanged,
    Applied(Changes),
    /// Reported through the [`ErrorReporter`]; snapshot not advanced.
    Failed,
}

/// Applies serialized map state to a display, one delta at a time.
///
/// A snapshot of the last applied state is kept per projection, so switching
/// away and back compares against what that projection last showed.
pub struct StateReconciler<D, R = TracingReporter, C = SystemClock> {
    display: D,
    reporter: R,
    clock: C,
    last_state: BTreeMap<String, ParsedState>,
}

impl<D: MapDisplay> StateReconciler<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            reporter: TracingReporter,
            clock: SystemClock,
            last_state: BTreeMap::new(),
        }
    }
}

impl<D, R, C> StateReconciler<D, R, C>
where
    D: MapDisplay,
    R: ErrorReporter,
    C: Clock,
{
    pub fn with_reporter<R2: ErrorReporter>(self, reporter: R2) -> StateReconciler<D, R2, C> {
        StateReconciler {
            display: self.display,
            reporter,
            clock: self.clock,
            last_state: self.last_state,
        }
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> StateReconciler<D, R, C2> {
        StateReconciler {
            display: self.display,
            reporter: self.reporter,
            clock,
            last_state: self.last_state,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Last state applied while `projection` was active.
    pub fn last_applied(&self, projection: &str) -> Option<&ParsedState> {
        self.last_state.get(projection)
    }

    /// Frame the leading edge of today's imagery. Call once after construction.
    ///
    /// Does nothing outside the geographic projection. Returns the extent
    /// that was applied.
    pub fn init(&mut self) -> Option<GeoExtent> {
        if !supports_leading_edge(self.display.projection()) {
            return None;
        }
        let extent = leading_extent(self.clock.utc_hour());
        match self.display.zoom_to_extent(extent, true) {
            Ok(()) => Some(extent),
            Err(err) => {
                let err = ReconcileError::from_display(DisplayOp::ZoomToExtent)(err);
                self.reporter.error(UPDATE_FAILED, &err);
                None
            }
        }
    }

    /// Bring the display in line with `query`.
    ///
    /// Never fails: display errors are reported and the call returns
    /// [`Outcome::Failed`] without touching the stored snapshot.
    pub fn reconcile(&mut self, query: &str) -> Outcome {
        let last = self
            .last_state
            .entry(self.display.projection().to_string())
            .or_default();
        if last.query_string.as_deref() == Some(query) {
            return Outcome::Unchanged;
        }
        let last = last.clone();

        debug!("reconciling map state: {query}");
        let state = ParsedState::parse(query);
        debug!(?state, "parsed map state");

        match self.apply(state, &last) {
            Ok((state, changes)) => {
                self.last_state
                    .insert(self.display.projection().to_string(), state);
                Outcome::Applied(changes)
            }
            Err(err) => {
                self.reporter.error(UPDATE_FAILED, &err);
                Outcome::Failed
            }
        }
    }

    fn apply(
        &mut self,
        mut state: ParsedState,
        last: &ParsedState,
    ) -> Result<(ParsedState, Changes), ReconcileError> {
        let mut changes = Changes::default();
        let mut last_palettes = last.palettes_string.as_deref();

        let switch = state
            .switch
            .as_deref()
            .filter(|s| Some(*s) != last.switch.as_deref());
        if let Some(requested) = switch {
            let projection = self.resolve_projection(requested);
            self.display
                .set_projection(&projection)
                .map_err(ReconcileError::from_display(DisplayOp::SetProjection))?;
            self.display
                .set_layers(&state.products)
                .map_err(ReconcileError::from_display(DisplayOp::SetLayers))?;
            changes.projection = Some(projection);
            changes.layers = true;
        } else if state.products_string != last.products_string {
            self.display
                .set_layers(&state.products)
                .map_err(ReconcileError::from_display(DisplayOp::SetLayers))?;
            changes.layers = true;
            // Palettes attach to layers, so new layers need them reapplied.
            last_palettes = Some("");
        }

        if state.time != last.time {
            let day = self.resolve_day(&mut state.time);
            self.display
                .set_day(day)
                .map_err(ReconcileError::from_display(DisplayOp::SetDay))?;
            changes.day = Some(day);
        }

        if state.palettes_string.as_deref() != last_palettes {
            self.display
                .set_palettes(&state.palettes)
                .map_err(ReconcileError::from_display(DisplayOp::SetPalettes))?;
            changes.palettes = true;
        }

        Ok((state, changes))
    }

    fn resolve_projection(&mut self, requested: &str) -> String {
        if self.display.config().is_known(requested) {
            return requested.to_string();
        }
        let fallback = self.display.config().default_projection.clone();
        self.reporter
            .warn(&format!("Invalid projection: {requested}, using: {fallback}"));
        fallback
    }

    /// Resolve the day to show, writing the value actually used back into
    /// `time` so the snapshot records it.
    fn resolve_day(&mut self, time: &mut Option<String>) -> DateTime<Utc> {
        let now = self.clock.now().trunc_subsecs(0);
        let raw = time.get_or_insert_with(|| format_iso8601(now));
        match parse_iso8601(raw.as_str()) {
            Ok(day) => day,
            Err(err) => {
                self.reporter
                    .warn(&format!("Invalid time: {}, using today", err.input));
                *raw = format_iso8601(now);
                now
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, StateReconciler};
    use crate::config::MapConfig;
    use crate::display::{DisplayOp, MapDisplay, RecordingDisplay};
    use crate::report::RecordingReporter;
    use chrono::{TimeZone, Utc};
    use foundation::FixedClock;

    fn reconciler() -> StateReconciler<RecordingDisplay, RecordingReporter, FixedClock> {
        let config = MapConfig::new("geographic", ["geographic", "arctic", "antarctic"]);
        StateReconciler::new(RecordingDisplay::new(config))
            .with_reporter(RecordingReporter::new())
            .with_clock(FixedClock::new(
                Utc.with_ymd_and_hms(2013, 5, 14, 15, 0, 0).unwrap(),
            ))
    }

    #[test]
    fn snapshot_is_created_lazily_per_projection() {
        let mut r = reconciler();
        assert!(r.last_applied("geographic").is_none());
        r.reconcile("products=baselayers,a");
        assert_eq!(
            r.last_applied("geographic").unwrap().query_string.as_deref(),
            Some("products=baselayers,a")
        );
        assert!(r.last_applied("arctic").is_none());
    }

    #[test]
    fn snapshot_follows_the_switched_projection() {
        let mut r = reconciler();
        r.reconcile("switch=arctic&products=baselayers,a");
        assert_eq!(r.display().projection(), "arctic");
        assert!(r.last_applied("arctic").is_some());
        // The entry for the starting projection exists but was never advanced.
        assert_eq!(r.last_applied("geographic").unwrap().query_string, None);
    }

    #[test]
    fn failed_call_keeps_previous_snapshot() {
        let mut r = reconciler();
        r.reconcile("products=baselayers,a");
        r.display_mut().fail_on(DisplayOp::SetLayers);
        assert_eq!(r.reconcile("products=baselayers,b"), Outcome::Failed);
        assert_eq!(
            r.last_applied("geographic").unwrap().products_string.as_deref(),
            Some("baselayers,a")
        );
    }

    #[test]
    fn init_reports_display_failures() {
        let mut r = reconciler();
        r.display_mut().fail_on(DisplayOp::ZoomToExtent);
        assert_eq!(r.init(), None);
        assert_eq!(r.reporter().errors().count(), 1);
    }
}
