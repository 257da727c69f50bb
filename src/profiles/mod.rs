//! Input records: farm, seed, request
//!
//! All records derive serde (snake_case) so callers may hand them over as
//! JSON; the engine itself mandates no wire format.

pub mod levels;
pub mod climate_tier;
pub mod farm;
pub mod seed;
pub mod request;

pub use levels::{Level, DrainageClass, SoilTexture};
pub use climate_tier::{ClimateTier, TierMatch, match_tiers};
pub use farm::{
    FarmProfile, FarmRecord, GeoLocation, SoilProfile, ClimateSummary, Infrastructure,
    ClimateHistory, SeasonClimate,
};
pub use seed::{
    SeedProfile, CropType, VarietyClass, ValueRange, DrainageRange, SoilRequirements,
    ClimateRequirements, Tolerances, Resistances, MarketSignal, PerformanceRecord,
};
pub use request::{RequestParameters, Season, RiskTolerance, MarketPreference, WeightOverrides};
