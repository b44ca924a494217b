/// Core data types for the ensemble meteogram statistics engine.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies — only types.

// ---------------------------------------------------------------------------
// Member identifiers
// ---------------------------------------------------------------------------

/// Member id of the unperturbed control run. Every ensemble in the MEPS
/// export uses this sentinel for the control trajectory; perturbed members
/// are "mbr001", "mbr002", and so on.
pub const CONTROL_MEMBER_ID: &str = "mbr000";

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// A single ensemble member value for one station at one validity time.
///
/// Many records share a (station_name, valid_time) pair — one per ensemble
/// member. Records are owned by the external data loader and are never
/// mutated by this crate; directional correction produces annotated copies
/// (see `analysis::circular::CorrectedRecord`).
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleRecord {
    pub station_name: String,
    /// Validity timestamp as delivered by the loader, e.g.
    /// "2022-08-15 12:00:00". Parsed with `config::TimeSettings` when
    /// chronological ordering is needed.
    pub valid_time: String,
    pub member_id: String,
    /// Value of the active forecast parameter for this member.
    pub value: f64,
    /// Weather symbol / icon code carried through to dot-plot glyphs.
    pub symbol_code: String,
}

impl EnsembleRecord {
    /// True if this record belongs to the unperturbed control member.
    pub fn is_control(&self) -> bool {
        self.member_id == CONTROL_MEMBER_ID
    }
}

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Seven-number statistical summary of one validity-time group, plus the
/// control-member value and the threshold exceedance probability.
///
/// Invariant: q00 <= q10 <= q25 <= q50 <= q75 <= q90 <= q100.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileSummary {
    pub valid_time: String,
    pub q00: f64,
    pub q10: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub q90: f64,
    pub q100: f64,
    pub mean: f64,
    /// Value of the control member, if one was present in the group.
    pub control: Option<f64>,
    /// Fraction of members with value >= threshold, in [0, 1].
    /// `None` when no threshold was supplied.
    pub prob: Option<f64>,
}

/// Which quantile pair a band spans. Radial (directional) composition reuses
/// the outer and middle labels for its symmetric lower half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandRange {
    /// q00–q100 envelope (outer).
    Q00Q100,
    /// q10–q90 (middle).
    Q10Q90,
    /// q25–q75 interquartile (inner).
    Q25Q75,
}

impl std::fmt::Display for BandRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandRange::Q00Q100 => write!(f, "q00q100"),
            BandRange::Q10Q90 => write!(f, "q10q90"),
            BandRange::Q25Q75 => write!(f, "q25q75"),
        }
    }
}

/// One (min, max) band segment at one validity time, ready for area or arc
/// rendering by the external drawing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub valid_time: String,
    pub min: f64,
    pub max: f64,
    pub range: BandRange,
}

// ---------------------------------------------------------------------------
// Dot-plot types
// ---------------------------------------------------------------------------

/// Whether a dot belongs to the control run or a perturbed member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Control,
    Perturbed,
}

/// One ensemble member placed on the dot-plot grid for a single time slice.
/// Ephemeral — recomputed on every threshold/time change.
#[derive(Debug, Clone, PartialEq)]
pub struct DotPosition {
    /// Bin center in data units.
    pub x: f64,
    /// Stack position within the bin, in data units (step/2 + j*step).
    pub y: f64,
    pub member_id: String,
    pub member_kind: MemberKind,
    pub exceeds_threshold: bool,
    pub threshold: Option<f64>,
    pub symbol_code: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors arising while aggregating a validity-time group.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// A validity-time group contained zero records. Surfaced per group so
    /// other groups keep processing; silently skipping would misrender the
    /// downstream chart.
    EmptyGroup(String),
    /// No record in the group matched `CONTROL_MEMBER_ID`. The summary is
    /// still produced with `control: None` (partial degradation).
    MissingControlMember(String),
    /// A validity timestamp could not be parsed with the configured format.
    BadValidTime { valid_time: String, detail: String },
}

impl std::fmt::Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationError::EmptyGroup(time) => {
                write!(f, "No members in validity-time group: {}", time)
            }
            AggregationError::MissingControlMember(time) => {
                write!(f, "No control member ({}) at {}", CONTROL_MEMBER_ID, time)
            }
            AggregationError::BadValidTime { valid_time, detail } => {
                write!(f, "Unparseable validity time '{}': {}", valid_time, detail)
            }
        }
    }
}

impl std::error::Error for AggregationError {}

/// Errors arising from the adaptive bin-width search.
#[derive(Debug, Clone, PartialEq)]
pub enum BinningError {
    /// No values to bin — the caller selected an empty time slice.
    EmptyInput,
    /// The nominal step was zero, negative, or non-finite.
    InvalidStep(f64),
}

impl std::fmt::Display for BinningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinningError::EmptyInput => write!(f, "Cannot bin an empty time slice"),
            BinningError::InvalidStep(s) => write!(f, "Invalid nominal bin step: {}", s),
        }
    }
}

impl std::error::Error for BinningError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
