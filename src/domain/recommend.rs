//! Species recommendation by climate band.
//!
//! Deterministic lookup keyed on absolute latitude, plus a synthetic NDVI
//! figure derived from the coordinates. No external data source.

use serde::Serialize;

/// Coarse climate classification by absolute latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClimateBand {
    Tropical,
    SemiArid,
    Subtropical,
    Temperate,
}

impl ClimateBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateBand::Tropical => "tropical",
            ClimateBand::SemiArid => "semi-arid",
            ClimateBand::Subtropical => "subtropical",
            ClimateBand::Temperate => "temperate",
        }
    }

    /// Species suited to this band.
    pub fn species(&self) -> &'static [&'static str] {
        match self {
            ClimateBand::Tropical => &[
                "Mangifera indica (Mango)",
                "Ficus religiosa (Peepal)",
                "Terminalia arjuna (Arjun)",
            ],
            ClimateBand::SemiArid => &[
                "Azadirachta indica (Neem)",
                "Acacia nilotica (Babul)",
                "Prosopis cineraria (Khejri)",
            ],
            ClimateBand::Subtropical => &[
                "Dalbergia sissoo (Shisham)",
                "Syzygium cumini (Jamun)",
                "Cassia fistula (Amaltas)",
            ],
            ClimateBand::Temperate => &[
                "Quercus spp. (Oak)",
                "Acer spp. (Maple)",
                "Pinus roxburghii (Chir Pine)",
            ],
        }
    }
}

/// Classify a latitude into a climate band. Non-finite input is treated
/// as equatorial.
pub fn climate_band(lat: f64) -> ClimateBand {
    let a = if lat.is_finite() { lat.abs() } else { 0.0 };
    if a < 15.0 {
        ClimateBand::Tropical
    } else if a < 30.0 {
        ClimateBand::SemiArid
    } else if a < 45.0 {
        ClimateBand::Subtropical
    } else {
        ClimateBand::Temperate
    }
}

/// Full recommendation payload for a site.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub ndvi: f64,
    pub climate_band: ClimateBand,
    pub preferred_species: Vec<&'static str>,
    pub default_species: Vec<&'static str>,
    pub density_per_hectare: u32,
    pub pattern: &'static str,
}

/// Compute the recommendation for a site.
pub fn recommend(lat: f64, lon: f64) -> Recommendation {
    // Synthetic NDVI in [0.1, 0.7], stable for a given coordinate pair.
    let ndvi = 0.4 + 0.3 * (lat + lon).to_radians().sin();
    let ndvi = (ndvi.clamp(0.1, 0.7) * 100.0).round() / 100.0;

    let band = climate_band(lat);
    Recommendation {
        ndvi,
        climate_band: band,
        preferred_species: band.species().to_vec(),
        default_species: vec!["Tectona grandis (Teak)", "Syzygium cumini (Jamun)"],
        density_per_hectare: 1600,
        pattern: "mixed clusters",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(climate_band(0.0), ClimateBand::Tropical);
        assert_eq!(climate_band(-14.9), ClimateBand::Tropical);
        assert_eq!(climate_band(15.0), ClimateBand::SemiArid);
        assert_eq!(climate_band(29.9), ClimateBand::SemiArid);
        assert_eq!(climate_band(-30.0), ClimateBand::Subtropical);
        assert_eq!(climate_band(45.0), ClimateBand::Temperate);
        assert_eq!(climate_band(f64::NAN), ClimateBand::Tropical);
    }

    #[test]
    fn ndvi_stays_in_range() {
        for lat in [-89.0, -45.0, 0.0, 23.5, 67.0] {
            for lon in [-180.0, -10.0, 0.0, 77.2, 179.0] {
                let r = recommend(lat, lon);
                assert!((0.1..=0.7).contains(&r.ndvi), "ndvi {} out of range", r.ndvi);
            }
        }
    }

    #[test]
    fn recommendation_is_deterministic() {
        let a = recommend(28.6, 77.2);
        let b = recommend(28.6, 77.2);
        assert_eq!(a.ndvi, b.ndvi);
        assert_eq!(a.climate_band, b.climate_band);
        assert_eq!(a.preferred_species, b.preferred_species);
    }
}
