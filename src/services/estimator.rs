/// ============================================================
///  Estimation Engine — pure rooftop solar arithmetic
///
///  Pipeline:
///   1. Effective usable area (shadow policy)
///   2. Annual generation  – area × irradiance × efficiency ×
///                           derate × orientation factor
///   3. Installed capacity – area ratio OR specific yield
///   4. Annual savings     – generation × tariff
///   5. Installation cost  – capacity × cost/kW
///   6. Payback            – cost / savings, absent when ≤ 0
///   7. CO₂ avoided        – generation × grid factor / 1000
///
///  No I/O, no state: identical inputs give bit-identical
///  outputs. All quantities arrive unit-resolved.
/// ============================================================

use crate::models::solar::{
    AreaPolicy, CapacityModel, EngineConstants, EngineParams, EstimationResult, PanelType,
    UnitSystem,
};

/// Unit-resolved numeric inputs for one engine run. Areas are in the unit
/// system selected by `EngineParams`; irradiance is per that same unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimationInput {
    pub total_area: f64,
    /// Shadow quantity; meaning depends on the configured `AreaPolicy`
    /// (covered area to subtract, or shadow-free area to cap at).
    pub shadow: f64,
    pub irradiance_per_unit: f64,
    pub orientation_factor: f64,
    pub tariff: f64,
}

/// Runs the full metric derivation for one request.
pub fn estimate(
    input: &EstimationInput,
    params: &EngineParams,
    constants: &EngineConstants,
) -> EstimationResult {
    let effective_area = effective_area(input.total_area, input.shadow, params.area_policy);

    let annual_generation_kwh = effective_area
        * input.irradiance_per_unit
        * constants.panel_efficiency
        * constants.system_derate
        * input.orientation_factor;

    let capacity_kw = match params.capacity_model {
        CapacityModel::AreaRatio => {
            let area_per_kw = match params.unit_system {
                UnitSystem::SquareMeters => constants.sqm_per_kw,
                UnitSystem::SquareFeet => constants.sqft_per_kw,
            };
            effective_area / area_per_kw
        }
        CapacityModel::SpecificYield => {
            annual_generation_kwh / constants.specific_yield_kwh_per_kw
        }
    };

    let annual_savings = annual_generation_kwh * input.tariff;
    let installation_cost = capacity_kw * constants.cost_per_kw;

    let payback_years = if annual_savings > 0.0 {
        Some(installation_cost / annual_savings)
    } else {
        None
    };

    let co2_avoided_tons = annual_generation_kwh * constants.co2_kg_per_kwh / 1000.0;

    EstimationResult {
        effective_area,
        capacity_kw,
        annual_generation_kwh,
        annual_savings,
        installation_cost,
        payback_years,
        co2_avoided_tons,
    }
}

fn effective_area(total_area: f64, shadow: f64, policy: AreaPolicy) -> f64 {
    match policy {
        AreaPolicy::Subtract => (total_area - shadow).max(0.0),
        AreaPolicy::ShadowFreeMin => total_area.min(shadow),
    }
}

// ─── Panel recommendation thresholds ─────────────────────────────────────────
// Two parallel sets, one per canonical unit. Inclusive on the lower class.
const SQM_MONO_MAX: f64 = 50.0;
const SQM_POLY_MAX: f64 = 150.0;
const SQFT_MONO_MAX: f64 = 500.0;
const SQFT_POLY_MAX: f64 = 1500.0;

/// Suggests a panel technology class from the roof area. Pure threshold
/// classification; monotone in area for a fixed unit system.
pub fn recommend_panel(area: f64, unit: UnitSystem) -> PanelType {
    let (mono_max, poly_max) = match unit {
        UnitSystem::SquareMeters => (SQM_MONO_MAX, SQM_POLY_MAX),
        UnitSystem::SquareFeet => (SQFT_MONO_MAX, SQFT_POLY_MAX),
    };
    if area < mono_max {
        PanelType::Monocrystalline
    } else if area <= poly_max {
        PanelType::Polycrystalline
    } else {
        PanelType::ThinFilm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EngineParams {
        EngineParams::default()
    }

    fn constants() -> EngineConstants {
        EngineConstants::default()
    }

    fn reference_input() -> EstimationInput {
        EstimationInput {
            total_area: 100.0,
            shadow: 0.0,
            irradiance_per_unit: 1700.0,
            orientation_factor: 1.0,
            tariff: 7.0,
        }
    }

    #[test]
    fn reference_scenario_exact_arithmetic() {
        // 100 m², no shadow, 1700 kWh/m²/yr, south, ₹7/kWh
        let r = estimate(&reference_input(), &params(), &constants());
        assert_eq!(r.effective_area, 100.0);
        assert!((r.annual_generation_kwh - 28_900.0).abs() < 1e-9);
        assert!((r.annual_savings - 202_300.0).abs() < 1e-9);
        assert!((r.capacity_kw - 10.0).abs() < 1e-12);
        assert!((r.installation_cost - 500_000.0).abs() < 1e-9);
        let payback = r.payback_years.unwrap();
        assert!((payback - 500_000.0 / 202_300.0).abs() < 1e-12);
        assert!((payback - 2.47).abs() < 0.01, "payback {:.4}", payback);
        assert!((r.co2_avoided_tons - 23.698).abs() < 1e-9);
    }

    #[test]
    fn fully_shadowed_roof_produces_nothing() {
        let input = EstimationInput { shadow: 100.0, ..reference_input() };
        let r = estimate(&input, &params(), &constants());
        assert_eq!(r.effective_area, 0.0);
        assert_eq!(r.annual_generation_kwh, 0.0);
        assert_eq!(r.annual_savings, 0.0);
        assert_eq!(r.payback_years, None);
        assert_eq!(r.co2_avoided_tons, 0.0);
    }

    #[test]
    fn subtract_policy_floors_at_zero() {
        let input = EstimationInput { shadow: 250.0, ..reference_input() };
        let r = estimate(&input, &params(), &constants());
        assert_eq!(r.effective_area, 0.0);
    }

    #[test]
    fn shadow_free_min_policy_caps_at_both_sides() {
        let p = EngineParams { area_policy: AreaPolicy::ShadowFreeMin, ..params() };

        // Shadow-free area smaller than the roof
        let input = EstimationInput { shadow: 60.0, ..reference_input() };
        assert_eq!(estimate(&input, &p, &constants()).effective_area, 60.0);

        // Shadow-free area larger than the roof
        let input = EstimationInput { shadow: 160.0, ..reference_input() };
        assert_eq!(estimate(&input, &p, &constants()).effective_area, 100.0);
    }

    #[test]
    fn zero_tariff_means_no_payback() {
        let input = EstimationInput { tariff: 0.0, ..reference_input() };
        let r = estimate(&input, &params(), &constants());
        assert!(r.annual_generation_kwh > 0.0);
        assert_eq!(r.annual_savings, 0.0);
        assert_eq!(r.payback_years, None);
    }

    #[test]
    fn engine_is_deterministic() {
        let input = EstimationInput { shadow: 13.7, tariff: 6.3, ..reference_input() };
        let a = estimate(&input, &params(), &constants());
        let b = estimate(&input, &params(), &constants());
        assert_eq!(a, b);
    }

    #[test]
    fn capacity_models_diverge_off_norm() {
        // At 1700 kWh/m²/yr the two derivations disagree: the yield constant
        // embeds a regional norm, the area ratio does not.
        let area_based = estimate(&reference_input(), &params(), &constants());
        let yield_params =
            EngineParams { capacity_model: CapacityModel::SpecificYield, ..params() };
        let yield_based = estimate(&reference_input(), &yield_params, &constants());

        assert!((area_based.capacity_kw - 10.0).abs() < 1e-12);
        assert!((yield_based.capacity_kw - 28_900.0 / 1400.0).abs() < 1e-9);
        assert!(yield_based.capacity_kw != area_based.capacity_kw);
    }

    #[test]
    fn sqft_unit_uses_its_own_ratio() {
        let p = EngineParams { unit_system: UnitSystem::SquareFeet, ..params() };
        let input = EstimationInput {
            total_area: 1000.0,
            irradiance_per_unit: 1700.0 / crate::models::solar::SQFT_PER_SQM,
            ..reference_input()
        };
        let r = estimate(&input, &p, &constants());
        assert!((r.capacity_kw - 10.0).abs() < 1e-12);
    }

    #[test]
    fn recommendation_thresholds_per_unit() {
        use PanelType::*;
        assert_eq!(recommend_panel(49.9, UnitSystem::SquareMeters), Monocrystalline);
        assert_eq!(recommend_panel(50.0, UnitSystem::SquareMeters), Polycrystalline);
        assert_eq!(recommend_panel(150.0, UnitSystem::SquareMeters), Polycrystalline);
        assert_eq!(recommend_panel(150.1, UnitSystem::SquareMeters), ThinFilm);

        assert_eq!(recommend_panel(499.0, UnitSystem::SquareFeet), Monocrystalline);
        assert_eq!(recommend_panel(500.0, UnitSystem::SquareFeet), Polycrystalline);
        assert_eq!(recommend_panel(1500.0, UnitSystem::SquareFeet), Polycrystalline);
        assert_eq!(recommend_panel(1501.0, UnitSystem::SquareFeet), ThinFilm);
    }

    #[test]
    fn recommendation_is_monotone_in_area() {
        fn rank(p: PanelType) -> u8 {
            match p {
                PanelType::Monocrystalline => 0,
                PanelType::Polycrystalline => 1,
                PanelType::ThinFilm => 2,
            }
        }
        for unit in [UnitSystem::SquareMeters, UnitSystem::SquareFeet] {
            let mut prev = 0;
            let mut area = 0.0;
            while area < 2500.0 {
                let r = rank(recommend_panel(area, unit));
                assert!(r >= prev, "recommendation moved backward at {} {:?}", area, unit);
                prev = r;
                area += 7.3;
            }
        }
    }
}
