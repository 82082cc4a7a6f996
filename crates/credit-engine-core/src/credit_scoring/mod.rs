//! Credit scoring, structural and reduced-form default models, and
//! rating migration.

pub mod analytics;
pub mod migration;
pub mod reduced_form;
pub mod structural;
pub mod zscore;

pub use analytics::{
    assess_credit, default_probability_curve, CreditAssessmentInput, CreditAssessmentOutput,
    DefaultProbabilityInput, DefaultProbabilityOutput, MigrationQuery, MigrationSummary,
};
pub use migration::MigrationMatrix;
pub use reduced_form::{
    forward_default_probability, hazard_rate_from_probability, reduced_form_default_probability, DefaultCurve,
};
pub use structural::{
    black_cox_default_probability, kmv_distance_to_default, merton_distance_to_default, BlackCoxInput,
    DistanceToDefault, KmvInput, MertonInput,
};
pub use zscore::{
    altman_z_score, composite_credit_score, rating_from_score, zone_for, AltmanInput, AltmanResult,
    CompositeScore, CompositeScoreInput, CreditRating, ZScoreZone,
};
