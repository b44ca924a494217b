/// Forecast parameter registry for the ensemble meteogram core.
///
/// Defines the canonical set of forecast parameters the engine aggregates,
/// along with their data keys, display units, nominal dot-plot bin steps,
/// and whether they are directional (wrap at 0/360 degrees). This is the
/// single source of truth for parameter keys — other modules should look
/// parameters up here rather than hardcoding keys.

// ---------------------------------------------------------------------------
// Parameter metadata
// ---------------------------------------------------------------------------

/// Metadata for a single forecast parameter.
pub struct ParamSpec {
    /// Short selection key used by the UI layer, e.g. "temp".
    pub key: &'static str,
    /// Field name carrying this parameter's value in the loader's records,
    /// e.g. "T2m" for 2-metre temperature.
    pub data_key: &'static str,
    /// Display unit, e.g. "m/s".
    pub unit: &'static str,
    /// Nominal dot-plot bin width, the starting point for the adaptive
    /// bin-width search.
    pub nominal_step: f64,
    /// When true the nominal step is used verbatim — the adaptive search is
    /// skipped. Used for parameters with a natural reporting resolution.
    pub force_step: bool,
    /// True for compass-degree parameters that wrap at the 0/360 boundary
    /// and need quadrant correction before quantile aggregation.
    pub directional: bool,
}

/// All forecast parameters handled by the engine, matching the fields of the
/// MEPS major-cities ensemble export.
pub static PARAM_REGISTRY: &[ParamSpec] = &[
    ParamSpec {
        key: "temp",
        data_key: "T2m",
        unit: "\u{2103}",
        nominal_step: 1.0,
        force_step: false,
        directional: false,
    },
    ParamSpec {
        key: "windspeed",
        data_key: "S10m",
        unit: "m/s",
        nominal_step: 1.0,
        force_step: false,
        directional: false,
    },
    ParamSpec {
        key: "winddir",
        data_key: "D10m",
        unit: "\u{00b0}",
        nominal_step: 10.0,
        force_step: false,
        directional: true,
    },
    ParamSpec {
        key: "precip",
        data_key: "Pcp",
        unit: "mm",
        nominal_step: 1.0,
        force_step: false,
        directional: false,
    },
    ParamSpec {
        key: "cloud",
        data_key: "CAF",
        unit: "%",
        nominal_step: 10.0,
        force_step: true, // cloud fraction reports in 10% steps
        directional: false,
    },
    ParamSpec {
        key: "hum",
        data_key: "RH2m",
        unit: "%",
        nominal_step: 5.0,
        force_step: false,
        directional: false,
    },
];

/// Looks up a parameter by selection key. Returns `None` if not found.
pub fn find_param(key: &str) -> Option<&'static ParamSpec> {
    PARAM_REGISTRY.iter().find(|p| p.key == key)
}

/// Looks up a parameter by its record data key, e.g. "T2m".
pub fn find_param_by_data_key(data_key: &str) -> Option<&'static ParamSpec> {
    PARAM_REGISTRY.iter().find(|p| p.data_key == data_key)
}

/// Returns the selection keys of all registered parameters.
pub fn all_param_keys() -> Vec<&'static str> {
    PARAM_REGISTRY.iter().map(|p| p.key).collect()
}

/// Returns the parameters that need directional (quadrant) correction.
pub fn directional_params() -> Vec<&'static ParamSpec> {
    PARAM_REGISTRY.iter().filter(|p| p.directional).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
