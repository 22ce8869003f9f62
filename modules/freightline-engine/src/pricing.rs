//! Default freight pricing: a per-km rate plus a flat fee, rounded down to
//! the cent.

use freightline_common::{FreightConfig, Route, RouteError};

use crate::traits::FreightCalculator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceFreightCalculator {
    price_per_km: f64,
    base_fee: f64,
}

impl DistanceFreightCalculator {
    pub fn new(price_per_km: f64, base_fee: f64) -> Self {
        Self {
            price_per_km,
            base_fee,
        }
    }
}

impl Default for DistanceFreightCalculator {
    fn default() -> Self {
        Self::from(&FreightConfig::default())
    }
}

impl From<&FreightConfig> for DistanceFreightCalculator {
    fn from(config: &FreightConfig) -> Self {
        Self::new(config.price_per_km, config.base_fee)
    }
}

impl FreightCalculator for DistanceFreightCalculator {
    fn calculate(&self, route: &Route) -> Result<f64, RouteError> {
        let raw = route.distance as f64 * self.price_per_km + self.base_fee;
        let price = (raw * 100.0).floor() / 100.0;

        if !price.is_finite() || price < 0.0 {
            return Err(RouteError::Calculation {
                route_id: route.id.clone(),
                reason: format!("computed price {price} is not a valid amount"),
            });
        }
        Ok(price)
    }
}
