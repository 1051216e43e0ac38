use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use foundation::GeoExtent;
use layers::PaletteAssignments;
use serde::Serialize;

use crate::config::MapConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    #[error("unknown projection: {0}")]
    UnknownProjection(String),
    #[error("{op} rejected: {message}")]
    Rejected { op: DisplayOp, message: String },
}

/// The map display the reconciler drives.
///
/// Drawing, tiling and navigation live behind this trait; the reconciler only
/// reads the active projection and the config, and issues the mutations below.
pub trait MapDisplay {
    /// Active projection id.
    fn projection(&self) -> &str;

    fn config(&self) -> &MapConfig;

    fn set_projection(&mut self, projection: &str) -> Result<(), DisplayError>;

    /// Replace the visible layer set. Order is display order.
    fn set_layers(&mut self, layers: &[String]) -> Result<(), DisplayError>;

    fn set_day(&mut self, day: DateTime<Utc>) -> Result<(), DisplayError>;

    fn set_palettes(&mut self, palettes: &PaletteAssignments) -> Result<(), DisplayError>;

    fn zoom_to_extent(&mut self, extent: GeoExtent, animate: bool) -> Result<(), DisplayError>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOp {
    SetProjection,
    SetLayers,
    SetDay,
    SetPalettes,
    ZoomToExtent,
}

impl std::fmt::Display for DisplayOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DisplayOp::SetProjection => "set_projection",
            DisplayOp::SetLayers => "set_layers",
            DisplayOp::SetDay => "set_day",
            DisplayOp::SetPalettes => "set_palettes",
            DisplayOp::ZoomToExtent => "zoom_to_extent",
        };
        f.write_str(name)
    }
}

/// One mutation accepted by a [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayCall {
    SetProjection { projection: String },
    SetLayers { layers: Vec<String> },
    SetDay { day: DateTime<Utc> },
    SetPalettes { palettes: PaletteAssignments },
    ZoomToExtent { extent: [f64; 4], animate: bool },
}

impl DisplayCall {
    pub fn op(&self) -> DisplayOp {
        match self {
            DisplayCall::SetProjection { .. } => DisplayOp::SetProjection,
            DisplayCall::SetLayers { .. } => DisplayOp::SetLayers,
            DisplayCall::SetDay { .. } => DisplayOp::SetDay,
            DisplayCall::SetPalettes { .. } => DisplayOp::SetPalettes,
            DisplayCall::ZoomToExtent { .. } => DisplayOp::ZoomToExtent,
        }
    }
}

/// In-memory display that keeps the current view state and a log of every
/// accepted mutation.
///
/// Operations can be made to fail with [`RecordingDisplay::fail_on`]; failed
/// calls change nothing and are not logged.
#[derive(Debug, Clone)]
pub struct RecordingDisplay {
    config: MapConfig,
    projection: String,
    layers: Vec<String>,
    day: Option<DateTime<Utc>>,
    palettes: PaletteAssignments,
    calls: Vec<DisplayCall>,
    failing: BTreeSet<DisplayOp>,
}

impl RecordingDisplay {
    /// Starts in the config's default projection.
    pub fn new(config: MapConfig) -> Self {
        let projection = config.default_projection.clone();
        Self {
            config,
            projection,
            layers: Vec::new(),
            day: None,
            palettes: PaletteAssignments::new(),
            calls: Vec::new(),
            failing: BTreeSet::new(),
        }
    }

    pub fn fail_on(&mut self, op: DisplayOp) {
        self.failing.insert(op);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn day(&self) -> Option<DateTime<Utc>> {
        self.day
    }

    pub fn palettes(&self) -> &PaletteAssignments {
        &self.palettes
    }

    pub fn calls(&self) -> &[DisplayCall] {
        &self.calls
    }

    pub fn drain(&mut self) -> Vec<DisplayCall> {
        std::mem::take(&mut self.calls)
    }

    fn check(&self, op: DisplayOp) -> Result<(), DisplayError> {
        if self.failing.contains(&op) {
            return Err(DisplayError::Rejected {
                op,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl MapDisplay for RecordingDisplay {
    fn projection(&self) -> &str {
        &self.projection
    }

    fn config(&self) -> &MapConfig {
        &self.config
    }

    fn set_projection(&mut self, projection: &str) -> Result<(), DisplayError> {
        self.check(DisplayOp::SetProjection)?;
        if !self.config.is_known(projection) {
            return Err(DisplayError::UnknownProjection(projection.to_string()));
        }
        self.projection = projection.to_string();
        self.calls.push(DisplayCall::SetProjection {
            projection: projection.to_string(),
        });
        Ok(())
    }

    fn set_layers(&mut self, layers: &[String]) -> Result<(), DisplayError> {
        self.check(DisplayOp::SetLayers)?;
        self.layers = layers.to_vec();
        self.calls.push(DisplayCall::SetLayers {
            layers: layers.to_vec(),
        });
        Ok(())
    }

    fn set_day(&mut self, day: DateTime<Utc>) -> Result<(), DisplayError> {
        self.check(DisplayOp::SetDay)?;
        self.day = Some(day);
        self.calls.push(DisplayCall::SetDay { day });
        Ok(())
    }

    fn set_palettes(&mut self, palettes: &PaletteAssignments) -> Result<(), DisplayError> {
        self.check(DisplayOp::SetPalettes)?;
        self.palettes = palettes.clone();
        self.calls.push(DisplayCall::SetPalettes {
            palettes: palettes.clone(),
        });
        Ok(())
    }

    fn zoom_to_extent(&mut self, extent: GeoExtent, animate: bool) -> Result<(), DisplayError> {
        self.check(DisplayOp::ZoomToExtent)?;
        self.calls.push(DisplayCall::ZoomToExtent {
            extent: extent.to_array(),
            animate,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayCall, DisplayError, DisplayOp, MapDisplay, RecordingDisplay};
    use crate::config::MapConfig;

    fn display() -> RecordingDisplay {
        RecordingDisplay::new(MapConfig::new("geographic", ["geographic", "arctic"]))
    }

    #[test]
    fn starts_in_default_projection() {
        let d = display();
        assert_eq!(d.projection(), "geographic");
        assert!(d.calls().is_empty());
    }

    #[test]
    fn records_accepted_calls_in_order() {
        let mut d = display();
        d.set_projection("arctic").unwrap();
        d.set_layers(&["a".to_string()]).unwrap();
        assert_eq!(d.projection(), "arctic");
        assert_eq!(d.layers(), ["a".to_string()]);
        let ops: Vec<DisplayOp> = d.calls().iter().map(DisplayCall::op).collect();
        assert_eq!(ops, vec![DisplayOp::SetProjection, DisplayOp::SetLayers]);
    }

    #[test]
    fn rejects_unknown_projection() {
        let mut d = display();
        let err = d.set_projection("mars").unwrap_err();
        assert_eq!(err, DisplayError::UnknownProjection("mars".to_string()));
        assert_eq!(d.projection(), "geographic");
        assert!(d.calls().is_empty());
    }

    #[test]
    fn injected_failures_leave_state_untouched() {
        let mut d = display();
        d.fail_on(DisplayOp::SetLayers);
        assert!(d.set_layers(&["a".to_string()]).is_err());
        assert!(d.layers().is_empty());
        d.clear_failures();
        d.set_layers(&["a".to_string()]).unwrap();
        assert_eq!(d.drain().len(), 1);
        assert!(d.calls().is_empty());
    }

    #[test]
    fn calls_serialize_with_op_tag() {
        let call = DisplayCall::SetLayers {
            layers: vec!["a".to_string()],
        };
        let json = serde_json::to_string(&call).unwrap();
        assert_eq!(json, r#"{"op":"set_layers","layers":["a"]}"#);
    }
}
