use crate::body::BodyId;

pub type PlayerId = u32;

/// A player taking part in a match and the robot it drives.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub robot: BodyId,
    pub color: u32,
    /// World time at which the robot was spawned (s)
    pub joined_at: f64,
}

/// Robot colour for a player: hues spread by the golden angle so that
/// consecutive ids stay easy to tell apart.
pub fn color_from_id(id: PlayerId) -> u32 {
    let hue = (id as f64 * 137.508) % 360.0;
    hue_to_rgb(hue, 0.6, 0.9)
}

fn hue_to_rgb(hue: f64, saturation: f64, value: f64) -> u32 {
    let chroma = value * saturation;
    let sector = hue / 60.0;
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let floor = value - chroma;

    let [r, g, b] = match sector as u32 {
        0 => [chroma, second, 0.0],
        1 => [second, chroma, 0.0],
        2 => [0.0, chroma, second],
        3 => [0.0, second, chroma],
        4 => [second, 0.0, chroma],
        _ => [chroma, 0.0, second],
    };
    let channel = |c: f64| ((c + floor) * 255.0).round().clamp(0.0, 255.0) as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}
