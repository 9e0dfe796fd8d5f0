//! Patient record types and the feature encoder.
//!
//! The classifiers are encoding-oblivious: they consume a plain numeric
//! vector and assume it was produced with the same column order and ordinal
//! coding used at training time. Both are pinned here. Every categorical
//! field carries its declared value list, and a value's code is its position
//! in that list; reordering a list silently corrupts every prediction, so the
//! lists are part of the artifact contract, not an implementation detail.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CardioError, CardioResult};

/// Canonical training-time column order. Vectors handed to a model follow
/// this order exactly.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "Age",
    "Sex",
    "ChestPainType",
    "RestingBP",
    "Cholesterol",
    "FastingBS",
    "RestingECG",
    "MaxHR",
    "ExerciseAngina",
    "Oldpeak",
    "ST_Slope",
];

/// Number of model input features
pub const FEATURE_COUNT: usize = 11;

/// A fully encoded model input in canonical column order
pub type FeatureVector = [f64; FEATURE_COUNT];

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident, $field:literal, [$(($variant:ident, $label:literal)),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Declared value list; ordinal code = position in this list.
            pub const VALUES: &'static [&'static str] = &[$($label),+];

            /// Zero-based ordinal code of this value (declaration position)
            pub fn code(self) -> f64 {
                self as usize as f64
            }
        }

        impl FromStr for $name {
            type Err = CardioError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(CardioError::invalid_input(
                        $field,
                        format!(
                            "unknown value '{}', expected one of: {}",
                            other,
                            Self::VALUES.join(", ")
                        ),
                    )),
                }
            }
        }
    };
}

categorical!(
    /// Patient sex (Female = 0, Male = 1)
    Sex, "Sex", [(Female, "Female"), (Male, "Male")]
);

categorical!(
    /// Chest pain classification, ordinal-coded 0..=3
    ChestPainType, "ChestPainType", [
        (TypicalAngina, "Typical Angina"),
        (AtypicalAngina, "Atypical Angina"),
        (NonAnginalPain, "Non-anginal Pain"),
        (Asymptomatic, "Asymptomatic"),
    ]
);

categorical!(
    /// Fasting blood sugar above/below 120 mg/dl
    FastingBs, "FastingBS", [(Below, "<120 mg/dl"), (Above, ">120 mg/dl")]
);

categorical!(
    /// Resting electrocardiogram result, ordinal-coded 0..=2
    RestingEcg, "RestingECG", [
        (Normal, "Normal"),
        (SttAbnormality, "ST-T Abnormality"),
        (LvHypertrophy, "Left Ventricular Hypertrophy"),
    ]
);

categorical!(
    /// Exercise-induced angina
    ExerciseAngina, "ExerciseAngina", [(No, "No"), (Yes, "Yes")]
);

categorical!(
    /// Slope of the peak exercise ST segment, ordinal-coded 0..=2
    StSlope, "ST_Slope", [
        (Upsloping, "Upsloping"),
        (Flat, "Flat"),
        (Downsloping, "Downsloping"),
    ]
);

/// One patient record with categorical fields as human-readable strings.
///
/// This is the panel-prediction wire contract; field names match the
/// training columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: String,
    #[serde(rename = "RestingBP")]
    pub resting_bp: f64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: f64,
    #[serde(rename = "FastingBS")]
    pub fasting_bs: String,
    #[serde(rename = "RestingECG")]
    pub resting_ecg: String,
    #[serde(rename = "MaxHR")]
    pub max_hr: f64,
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: String,
    #[serde(rename = "Oldpeak")]
    pub oldpeak: f64,
    #[serde(rename = "ST_Slope")]
    pub st_slope: String,
}

/// One patient record with categoricals already ordinal-coded.
///
/// This is the single-endpoint API contract (and the per-row shape of bulk
/// input): the caller ships numbers, we only range-check them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedPatient {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Sex")]
    pub sex: f64,
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: f64,
    #[serde(rename = "RestingBP")]
    pub resting_bp: f64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: f64,
    #[serde(rename = "FastingBS")]
    pub fasting_bs: f64,
    #[serde(rename = "RestingECG")]
    pub resting_ecg: f64,
    #[serde(rename = "MaxHR")]
    pub max_hr: f64,
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: f64,
    #[serde(rename = "Oldpeak")]
    pub oldpeak: f64,
    #[serde(rename = "ST_Slope")]
    pub st_slope: f64,
}

fn check_range(field: &str, value: f64, lo: f64, hi: f64) -> CardioResult<()> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(CardioError::invalid_input(
            field,
            format!("value {value} out of range [{lo}, {hi}]"),
        ))
    }
}

fn check_code(field: &str, value: f64, cardinality: usize) -> CardioResult<()> {
    let max = (cardinality - 1) as f64;
    if value.fract() == 0.0 && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(CardioError::invalid_input(
            field,
            format!("code {value} is not an integer in [0, {max}]"),
        ))
    }
}

fn validate_numeric_ranges(
    age: f64,
    resting_bp: f64,
    cholesterol: f64,
    max_hr: f64,
    oldpeak: f64,
) -> CardioResult<()> {
    check_range("Age", age, 0.0, 120.0)?;
    check_range("RestingBP", resting_bp, 0.0, 200.0)?;
    check_range("Cholesterol", cholesterol, 0.0, 600.0)?;
    check_range("MaxHR", max_hr, 0.0, 250.0)?;
    check_range("Oldpeak", oldpeak, 0.0, 10.0)?;
    Ok(())
}

impl PatientRecord {
    /// Encode this record as a numeric vector in canonical column order.
    ///
    /// Pure and deterministic. Unknown categorical strings and out-of-range
    /// numerics surface as [`CardioError::InvalidInput`].
    pub fn encode(&self) -> CardioResult<FeatureVector> {
        validate_numeric_ranges(
            self.age,
            self.resting_bp,
            self.cholesterol,
            self.max_hr,
            self.oldpeak,
        )?;

        Ok([
            self.age,
            Sex::from_str(&self.sex)?.code(),
            ChestPainType::from_str(&self.chest_pain_type)?.code(),
            self.resting_bp,
            self.cholesterol,
            FastingBs::from_str(&self.fasting_bs)?.code(),
            RestingEcg::from_str(&self.resting_ecg)?.code(),
            self.max_hr,
            ExerciseAngina::from_str(&self.exercise_angina)?.code(),
            self.oldpeak,
            StSlope::from_str(&self.st_slope)?.code(),
        ])
    }
}

impl EncodedPatient {
    /// Validate the pre-encoded fields and produce the canonical vector.
    pub fn to_vector(&self) -> CardioResult<FeatureVector> {
        validate_numeric_ranges(
            self.age,
            self.resting_bp,
            self.cholesterol,
            self.max_hr,
            self.oldpeak,
        )?;
        check_code("Sex", self.sex, Sex::VALUES.len())?;
        check_code("ChestPainType", self.chest_pain_type, ChestPainType::VALUES.len())?;
        check_code("FastingBS", self.fasting_bs, FastingBs::VALUES.len())?;
        check_code("RestingECG", self.resting_ecg, RestingEcg::VALUES.len())?;
        check_code("ExerciseAngina", self.exercise_angina, ExerciseAngina::VALUES.len())?;
        check_code("ST_Slope", self.st_slope, StSlope::VALUES.len())?;

        Ok([
            self.age,
            self.sex,
            self.chest_pain_type,
            self.resting_bp,
            self.cholesterol,
            self.fasting_bs,
            self.resting_ecg,
            self.max_hr,
            self.exercise_angina,
            self.oldpeak,
            self.st_slope,
        ])
    }
}
