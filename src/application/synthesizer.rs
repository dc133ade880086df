//! Feature synthesizer: derives the engineered columns from the base layout.
//!
//! Every engineered value is a pure function of one row's base values.
//! No rounding, clipping or NaN handling happens here.

use ndarray::{s, Array2, ArrayView1, ArrayView2};

use crate::domain::schema::{ENGINEERED_FEATURE_COUNT, FeatureSet};
use crate::domain::FeatureFrame;

// Base-column positions. Kept in step with `BASE_FEATURES` by a test.
const AGE: usize = 0;
const CHOLESTEROL: usize = 1;
const DIABETES: usize = 3;
const FAMILY_HISTORY: usize = 4;
const SMOKING: usize = 5;
const OBESITY: usize = 6;
const ALCOHOL: usize = 7;
const EXERCISE_HOURS: usize = 8;
const PREVIOUS_HEART_PROBLEMS: usize = 10;
const STRESS_LEVEL: usize = 12;
const SEDENTARY_HOURS: usize = 13;
const BMI: usize = 15;
const TRIGLYCERIDES: usize = 16;
const ACTIVITY_DAYS: usize = 17;
const SLEEP_HOURS: usize = 18;
const CK_MB: usize = 20;
const TROPONIN: usize = 21;
const SYSTOLIC: usize = 23;
const DIASTOLIC: usize = 24;

/// Engineered values for one row of base values, in `ENGINEERED_FEATURES` order.
#[must_use]
pub fn engineer_row(base: ArrayView1<'_, f64>) -> [f64; ENGINEERED_FEATURE_COUNT] {
    let age = base[AGE];
    let cholesterol = base[CHOLESTEROL];
    let diabetes = base[DIABETES];
    let family_history = base[FAMILY_HISTORY];
    let smoking = base[SMOKING];
    let obesity = base[OBESITY];
    let alcohol = base[ALCOHOL];
    let bmi = base[BMI];
    let systolic = base[SYSTOLIC];
    let diastolic = base[DIASTOLIC];
    let sedentary = base[SEDENTARY_HOURS];

    let lifestyle_risk = smoking + obesity + alcohol + (1.0 - base[ACTIVITY_DAYS] / 7.0);
    let medical_risk = diabetes + family_history + base[PREVIOUS_HEART_PROBLEMS];
    let pulse_pressure = systolic - diastolic;

    [
        lifestyle_risk,
        medical_risk,
        lifestyle_risk + medical_risk,
        age * bmi,
        age * cholesterol,
        cholesterol + base[TRIGLYCERIDES],
        pulse_pressure,
        diastolic + pulse_pressure / 3.0,
        base[CK_MB] + base[TROPONIN],
        base[EXERCISE_HOURS] - sedentary,
        1.0 - (base[SLEEP_HOURS] - 0.5).abs() * 2.0,
        age * age,
        bmi * bmi,
        cholesterol * cholesterol,
        smoking * diabetes,
        smoking * family_history,
        obesity * diabetes,
        base[STRESS_LEVEL] * sedentary,
    ]
}

/// Append the engineered columns to an `n x 25` base matrix.
///
/// The input is not modified; the result is a new `n x 43` matrix whose first
/// 25 columns equal the input.
#[must_use]
pub fn synthesize_values(base: ArrayView2<'_, f64>) -> Array2<f64> {
    let width = FeatureSet::Engineered.width();
    let split = FeatureSet::Raw.width();
    let mut out = Array2::zeros((base.nrows(), width));
    out.slice_mut(s![.., ..split]).assign(&base);
    for (src, mut dst) in base.rows().into_iter().zip(out.rows_mut()) {
        for (slot, value) in dst.slice_mut(s![split..]).iter_mut().zip(engineer_row(src)) {
            *slot = value;
        }
    }
    out
}

/// Synthesize an engineered frame from a base-layout frame.
#[must_use]
pub fn synthesize(base: &FeatureFrame) -> FeatureFrame {
    let values = synthesize_values(base.values());
    FeatureFrame::new(FeatureSet::Engineered.columns(), values)
        .unwrap_or_else(|| unreachable!("engineered matrix width matches its column list"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::normalizer::base_frame;
    use crate::domain::schema::{self, base_index, BASE_FEATURES, BASE_FEATURE_COUNT};
    use ndarray::{s, Array1, Axis};

    fn row_with(values: &[(&str, f64)]) -> Array1<f64> {
        let mut row = Array1::zeros(BASE_FEATURE_COUNT);
        for (name, v) in values {
            row[base_index(name).expect("known column")] = *v;
        }
        row
    }

    fn engineered(frame: &FeatureFrame, name: &str) -> f64 {
        frame.column(name).expect("engineered column")[0]
    }

    fn frame_of(row: Array1<f64>) -> FeatureFrame {
        let values = row.insert_axis(Axis(0));
        base_frame(values)
    }

    #[test]
    fn test_positions_match_layout() {
        let expected = [
            (AGE, schema::AGE),
            (CHOLESTEROL, schema::CHOLESTEROL),
            (DIABETES, schema::DIABETES),
            (FAMILY_HISTORY, schema::FAMILY_HISTORY),
            (SMOKING, schema::SMOKING),
            (OBESITY, schema::OBESITY),
            (ALCOHOL, schema::ALCOHOL),
            (EXERCISE_HOURS, schema::EXERCISE_HOURS),
            (PREVIOUS_HEART_PROBLEMS, schema::PREVIOUS_HEART_PROBLEMS),
            (STRESS_LEVEL, schema::STRESS_LEVEL),
            (SEDENTARY_HOURS, schema::SEDENTARY_HOURS),
            (BMI, schema::BMI),
            (TRIGLYCERIDES, schema::TRIGLYCERIDES),
            (ACTIVITY_DAYS, schema::ACTIVITY_DAYS),
            (SLEEP_HOURS, schema::SLEEP_HOURS),
            (CK_MB, schema::CK_MB),
            (TROPONIN, schema::TROPONIN),
            (SYSTOLIC, schema::SYSTOLIC),
            (DIASTOLIC, schema::DIASTOLIC),
        ];
        for (idx, name) in expected {
            assert_eq!(BASE_FEATURES[idx], name);
        }
    }

    #[test]
    fn test_interaction_terms() {
        let frame = synthesize(&frame_of(row_with(&[
            (schema::SMOKING, 1.0),
            (schema::DIABETES, 1.0),
        ])));

        assert_eq!(engineered(&frame, "Smoking_Diabetes"), 1.0);
        assert_eq!(engineered(&frame, "Smoking_FamilyHistory"), 0.0);
        assert_eq!(engineered(&frame, "Obesity_Diabetes"), 0.0);
        assert_eq!(engineered(&frame, "Medical_Risk"), 1.0);
    }

    #[test]
    fn test_blood_pressure_terms() {
        let frame = synthesize(&frame_of(row_with(&[
            (schema::SYSTOLIC, 0.8),
            (schema::DIASTOLIC, 0.5),
        ])));

        assert!((engineered(&frame, "Pulse_Pressure") - 0.3).abs() < 1e-12);
        assert!((engineered(&frame, "Mean_Arterial_Pressure") - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_row() {
        let frame = synthesize(&frame_of(Array1::zeros(BASE_FEATURE_COUNT)));

        assert_eq!(engineered(&frame, "Lifestyle_Risk"), 1.0);
        assert_eq!(engineered(&frame, "Total_Risk_Score"), 1.0);
        assert_eq!(engineered(&frame, "Sleep_Quality"), 0.0);
        assert_eq!(engineered(&frame, "Age_squared"), 0.0);
    }

    #[test]
    fn test_lifestyle_and_sleep() {
        let frame = synthesize(&frame_of(row_with(&[
            (schema::SMOKING, 1.0),
            (schema::OBESITY, 1.0),
            (schema::ACTIVITY_DAYS, 7.0),
            (schema::SLEEP_HOURS, 0.5),
            (schema::AGE, 0.5),
            (schema::BMI, 0.4),
        ])));

        assert_eq!(engineered(&frame, "Lifestyle_Risk"), 2.0);
        assert_eq!(engineered(&frame, "Sleep_Quality"), 1.0);
        assert!((engineered(&frame, "Age_BMI") - 0.2).abs() < 1e-12);
        assert!((engineered(&frame, "Age_squared") - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_shape_and_base_passthrough() {
        let base = frame_of(row_with(&[(schema::AGE, 0.3), (schema::DIASTOLIC, 0.9)]));
        let before = base.clone();
        let frame = synthesize(&base);

        assert_eq!(frame.ncols(), 43);
        assert_eq!(frame.columns(), FeatureSet::Engineered.columns().as_slice());
        assert_eq!(frame.values().slice(s![.., ..25]), base.values());
        assert_eq!(base, before);
    }

    #[test]
    fn test_deterministic() {
        let base = frame_of(Array1::from_iter(
            (0..BASE_FEATURE_COUNT).map(|i| (i as f64 * 0.037).sin().abs()),
        ));
        let a = synthesize(&base);
        let b = synthesize(&base);
        let bits = |f: &FeatureFrame| f.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }
}
