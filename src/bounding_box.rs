use crate::domain::{MaxDistance, Point, RenderArea};
use crate::geodesy;

/// Geographic extent that gets mapped onto the render area.
///
/// `left`/`right` are longitudes, `top`/`bottom` latitudes. `right >= left`
/// and `top >= bottom` hold for both constructors.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BoundingBox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub center: Point,
    pub render_area: RenderArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl BoundingBox {
    /// Extent reached by walking the region-of-interest radii from `center`
    /// in the four cardinal directions.
    pub fn from_center(center: Point, max_dist: &MaxDistance, render_area: RenderArea) -> Self {
        let north = geodesy::destination_point(center, 0.0, max_dist.y);
        let east = geodesy::destination_point(center, 90.0, max_dist.x);
        let south = geodesy::destination_point(center, 180.0, max_dist.y);
        let west = geodesy::destination_point(center, 270.0, max_dist.x);
        BoundingBox {
            left: west.lon,
            right: east.lon,
            top: north.lat,
            bottom: south.lat,
            center,
            render_area,
        }
    }

    /// Extent of the points actually observed.
    ///
    /// Without an explicit `center` the middle of the extent is used. Returns
    /// `None` when there are no points or they span zero width or height,
    /// since no finite scale factor exists for such a box.
    pub fn from_observed_extent<'a>(
        points: impl IntoIterator<Item = &'a Point>,
        render_area: RenderArea,
        center: Option<Point>,
    ) -> Option<Self> {
        let mut left = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;
        let mut top = f64::NEG_INFINITY;
        let mut bottom = f64::INFINITY;
        for point in points {
            left = left.min(point.lon);
            right = right.max(point.lon);
            top = top.max(point.lat);
            bottom = bottom.min(point.lat);
        }
        if !(right > left && top > bottom) {
            return None;
        }
        let center =
            center.unwrap_or_else(|| Point::new((top + bottom) / 2.0, (left + right) / 2.0));
        Some(BoundingBox {
            left,
            right,
            top,
            bottom,
            center,
            render_area,
        })
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Pixels per degree of latitude.
    pub fn scale_factor_lat(&self) -> f64 {
        let half_span = (self.center.lat - self.top)
            .abs()
            .max((self.center.lat - self.bottom).abs());
        self.render_area.height_px as f64 / half_span
    }

    /// Pixels per degree of longitude.
    pub fn scale_factor_lon(&self) -> f64 {
        let half_span = (self.center.lon - self.left)
            .abs()
            .max((self.center.lon - self.right).abs());
        self.render_area.width_px as f64 / half_span
    }

    pub fn project(&self, point: Point) -> PixelPoint {
        project(point.lat, point.lon, self)
    }
}

/// Maps a coordinate onto the canvas of `bbox`, with the bbox center at the
/// canvas center and pixel rows growing southwards.
pub fn project(lat: f64, lon: f64, bbox: &BoundingBox) -> PixelPoint {
    let width = bbox.render_area.width_px as f64;
    let height = bbox.render_area.height_px as f64;
    let x = width / 2.0 + (lon - bbox.center.lon) * bbox.scale_factor_lon();
    let y = height / 2.0 - (lat - bbox.center.lat) * bbox.scale_factor_lat();
    PixelPoint {
        x: x.trunc() as i64,
        y: y.trunc() as i64,
    }
}
