use crate::{Celsius, HEAT_THRESHOLD_C, model::Edge, model::RoutePreference};

/// Scale of the sun exposure penalty in the heat-avoiding cost model
pub const HEAT_PENALTY_WEIGHT: f64 = 4.0;

/// Traversal cost of an edge under a route preference.
///
/// `Fastest` is the raw distance. `Coolest` is the raw distance as long as
/// it is not hotter than [`HEAT_THRESHOLD_C`]; above it the exposed share of
/// the edge is penalised by its surface:
///
/// `distance * (1 + (1 - shade) * 4 * surface_multiplier)`
///
/// The result never drops below the raw distance, which keeps the geographic
/// A* heuristic admissible.
pub fn edge_cost(
    edge: &Edge,
    preference: RoutePreference,
    ambient_temperature_c: Celsius,
) -> f64 {
    let distance = f64::from(edge.distance_m);
    let hot = ambient_temperature_c > HEAT_THRESHOLD_C;

    match (preference, hot) {
        (RoutePreference::Fastest, _) | (RoutePreference::Coolest, false) => distance,
        (RoutePreference::Coolest, true) => {
            let exposure = 1.0 - f64::from(edge.shade_factor.clamp(0.0, 1.0));
            distance
                * (1.0 + exposure * HEAT_PENALTY_WEIGHT * edge.surface.thermal_multiplier())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SurfaceType;

    fn edge(surface: SurfaceType, shade: f32) -> Edge {
        Edge::new("e", "a", "b", 100.0, surface, shade)
    }

    #[test]
    fn fastest_ignores_heat() {
        let sunny = edge(SurfaceType::Asphalt, 0.0);
        assert_eq!(edge_cost(&sunny, RoutePreference::Fastest, 45.0), 100.0);
    }

    #[test]
    fn coolest_matches_fastest_up_to_threshold() {
        let sunny = edge(SurfaceType::Asphalt, 0.0);
        assert_eq!(edge_cost(&sunny, RoutePreference::Coolest, 28.0), 100.0);
        assert_eq!(edge_cost(&sunny, RoutePreference::Coolest, 12.0), 100.0);
        assert_eq!(edge_cost(&sunny, RoutePreference::Coolest, f32::NAN), 100.0);
    }

    #[test]
    fn exposed_asphalt_costs_seven_times_distance() {
        let sunny = edge(SurfaceType::Asphalt, 0.0);
        let cost = edge_cost(&sunny, RoutePreference::Coolest, 35.0);
        assert!((cost - 700.0).abs() < 1e-9);
    }

    #[test]
    fn full_shade_costs_raw_distance_on_any_surface() {
        for surface in [
            SurfaceType::Asphalt,
            SurfaceType::Concrete,
            SurfaceType::Gravel,
            SurfaceType::Grass,
        ] {
            let shaded = edge(surface, 1.0);
            assert_eq!(edge_cost(&shaded, RoutePreference::Coolest, 40.0), 100.0);
        }
    }

    #[test]
    fn partial_shade_scales_penalty() {
        let half = edge(SurfaceType::Grass, 0.5);
        // 100 * (1 + 0.5 * 4 * 0.5)
        let cost = edge_cost(&half, RoutePreference::Coolest, 30.0);
        assert!((cost - 200.0).abs() < 1e-9);
    }
}
