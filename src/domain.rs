use std::str::FromStr;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Point { lat, lon }
    }
}

impl FromStr for Point {
    type Err = String;

    /// Parses `"lat,lon"`, e.g. `"47.3773887,8.5386569"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat,lon\", got {:?}", s))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid latitude {:?}: {}", lat, err))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid longitude {:?}: {}", lon, err))?;
        Ok(Point { lat, lon })
    }
}

/// Size of the pixel canvas the segments are projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RenderArea {
    pub width_px: u32,
    pub height_px: u32,
}

impl RenderArea {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        RenderArea {
            width_px,
            height_px,
        }
    }

    pub fn square(size_px: u32) -> Self {
        RenderArea::new(size_px, size_px)
    }

    /// A0 portrait at 300 dpi.
    pub fn poster() -> Self {
        RenderArea::new(9933, 14043)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    meters: f64,
}

impl Distance {
    pub fn from_km(km: f64) -> Self {
        Distance {
            meters: km * 1000.0,
        }
    }

    pub fn meters(&self) -> u64 {
        self.meters as u64
    }

    pub fn km(&self) -> u64 {
        (self.meters / 1000.0) as u64
    }

    pub fn as_km_f64(&self) -> f64 {
        self.meters / 1000.0
    }
}

impl Default for Distance {
    fn default() -> Self {
        Distance::from_km(20.0)
    }
}

/// Radii of the region of interest, in kilometers.
///
/// `y` is the configured distance, `x` is scaled by the canvas aspect ratio.
/// `max_angle` is the bearing (radians) at which the limiting side switches
/// from the north/south edge to the east/west edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxDistance {
    pub x: f64,
    pub y: f64,
    pub max_angle: f64,
}

impl MaxDistance {
    pub fn from_distance(distance: Distance, render_area: RenderArea) -> Self {
        let y = distance.as_km_f64();
        let x = y * render_area.aspect_ratio();
        MaxDistance {
            x,
            y,
            max_angle: (x / (x * x + y * y).sqrt()).asin(),
        }
    }
}
