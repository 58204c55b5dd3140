use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

// === Controls (AI/input layer -> robot) ===

/// Steering and weapon commands a robot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub enum Control {
    Accelerate,
    Brake,
    TurnLeft,
    TurnRight,
    TurnUp,
    TurnDown,
    RollLeft,
    RollRight,
    PointLeft,
    PointRight,
    PointUp,
    PointDown,
    Shoot,
}

impl Control {
    pub const ALL: [Control; 13] = [
        Control::Accelerate,
        Control::Brake,
        Control::TurnLeft,
        Control::TurnRight,
        Control::TurnUp,
        Control::TurnDown,
        Control::RollLeft,
        Control::RollRight,
        Control::PointLeft,
        Control::PointRight,
        Control::PointUp,
        Control::PointDown,
        Control::Shoot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Control::Accelerate => "accelerate",
            Control::Brake => "brake",
            Control::TurnLeft => "turnLeft",
            Control::TurnRight => "turnRight",
            Control::TurnUp => "turnUp",
            Control::TurnDown => "turnDown",
            Control::RollLeft => "rollLeft",
            Control::RollRight => "rollRight",
            Control::PointLeft => "pointLeft",
            Control::PointRight => "pointRight",
            Control::PointUp => "pointUp",
            Control::PointDown => "pointDown",
            Control::Shoot => "shoot",
        }
    }

    /// Whether the command consumes an elapsed-time argument.
    pub fn is_timed(&self) -> bool {
        !matches!(self, Control::Shoot)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Control::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown command '{}'", s))
    }
}

// === Snapshots (world -> consumers) ===

/// What kind of body a snapshot entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub enum BodyKind {
    Planet,
    Robot,
    Projectile,
    Body,
}

/// A body projected into an observer's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct ViewObject {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: BodyKind,
    pub radius: f64,
    /// (forward, sideways, upward) coordinates relative to the view origin
    pub position: [f64; 3],
    pub color: u32,
}

/// Subjective view of one robot. The default value is the empty update
/// returned for unknown or dead players.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct ViewUpdate {
    /// Orientation of the view frame, (a, b, c, d)
    pub camera: [f64; 4],
    pub origin: [f64; 3],
    pub speed: f64,
    /// Height above the reference body's surface
    pub height: f64,
    /// Aim marker in view coordinates
    pub target: [f64; 3],
    /// Direction of the reference body's north pole in view coordinates
    pub compass: [f64; 3],
    pub objects: Vec<ViewObject>,
}

impl ViewUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ViewUpdate::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct GlobalObject {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: BodyKind,
    pub radius: f64,
    pub position: [f64; 3],
    pub color: u32,
}

/// Heading marker for the robot requesting a global update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub position: [f64; 3],
    pub direction: [f64; 3],
}

/// Absolute positions of every body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct GlobalUpdate {
    pub seconds: f64,
    pub objects: Vec<GlobalObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow: Option<Arrow>,
}

impl GlobalUpdate {
    pub fn is_empty(&self) -> bool {
        *self == GlobalUpdate::default()
    }
}

/// Round to 4 decimal places (ample for metres, keeps snapshots small)
#[inline]
pub fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

#[inline]
pub fn round4_array<const N: usize>(values: [f64; N]) -> [f64; N] {
    values.map(round4)
}
