use crate::error::{LinesError, Result};

/// Route type collapsed onto the small vocabulary the renderer colours by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct SimpleRouteType(pub u8);

impl SimpleRouteType {
    pub const TRAM: Self = SimpleRouteType(0);
    pub const SUBWAY: Self = SimpleRouteType(1);
    pub const RAIL: Self = SimpleRouteType(2);
    pub const BUS: Self = SimpleRouteType(3);
    pub const FERRY: Self = SimpleRouteType(4);
    pub const CABLE_CAR: Self = SimpleRouteType(5);
    pub const GONDOLA: Self = SimpleRouteType(6);
    pub const FUNICULAR: Self = SimpleRouteType(7);
    pub const TROLLEYBUS: Self = SimpleRouteType(11);
    pub const MONORAIL: Self = SimpleRouteType(12);
    pub const WATER: Self = SimpleRouteType(15);

    pub fn code(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for SimpleRouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps basic and extended GTFS route types onto [`SimpleRouteType`].
pub fn simplify_route_type(route_type: i32) -> Result<SimpleRouteType> {
    let simple = match route_type {
        0..=12 => SimpleRouteType(route_type as u8),
        // Railway service.
        100..=199 => SimpleRouteType::RAIL,
        // Coach service.
        200..=299 => SimpleRouteType::BUS,
        // Urban railway, metro, underground.
        400..=404 => SimpleRouteType::SUBWAY,
        405 => SimpleRouteType::MONORAIL,
        700..=799 => SimpleRouteType::BUS,
        800..=899 => SimpleRouteType::TROLLEYBUS,
        900..=999 => SimpleRouteType::TRAM,
        1000 => SimpleRouteType::WATER,
        // Aerial lift and funicular service.
        1300..=1400 => SimpleRouteType::GONDOLA,
        other => return Err(LinesError::UnknownRouteType(other)),
    };
    Ok(simple)
}
