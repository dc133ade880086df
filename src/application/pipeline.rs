//! Inference pipeline: orchestrates normalization, synthesis and scoring.
//!
//! The pipeline owns its loaded state behind a load-once cell. The first call
//! that needs the model reads the model, threshold and fill-value artifacts;
//! every later call reuses them. State is read-only after loading, so one
//! pipeline can be shared across threads without locking.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use rayon::prelude::*;

use crate::adapters::{load_model, FillValueStore, ThresholdStore};
use crate::config::PipelineConfig;
use crate::domain::{
    BatchPrediction, FeatureFrame, FeatureSet, FillValueMap, ModelInfo, PredictionResult, Record,
    RecordId,
};
use crate::ports::RiskModel;
use crate::CardioRiskError;

use super::classifier::ThresholdClassifier;
use super::normalizer::SchemaNormalizer;
use super::synthesizer::synthesize;

/// Everything loaded from disk, immutable once built.
#[derive(Debug)]
struct PipelineState {
    normalizer: SchemaNormalizer,
    classifier: ThresholdClassifier,
    model_sha256: Option<String>,
    loaded_at: DateTime<Utc>,
}

impl PipelineState {
    fn new(
        model: Box<dyn RiskModel>,
        fill_values: FillValueMap,
        threshold: f64,
        model_sha256: Option<String>,
    ) -> Result<Self, CardioRiskError> {
        Ok(Self {
            normalizer: SchemaNormalizer::new(fill_values),
            classifier: ThresholdClassifier::new(model, threshold)?,
            model_sha256,
            loaded_at: Utc::now(),
        })
    }

    /// Model-ready matrix for `records`; failing rows are reported at
    /// `row_offset + position`.
    fn features(
        &self,
        records: &[Record],
        row_offset: usize,
    ) -> Result<FeatureFrame, CardioRiskError> {
        let base = self.normalizer.normalize(records, row_offset)?;
        Ok(match self.classifier.feature_set() {
            FeatureSet::Raw => base,
            FeatureSet::Engineered => synthesize(&base),
        })
    }

    fn score(
        &self,
        records: &[Record],
        row_offset: usize,
    ) -> Result<Vec<PredictionResult>, CardioRiskError> {
        let frame = self.features(records, row_offset)?;
        let threshold = self.classifier.threshold();
        let scored = self.classifier.score(frame.values())?;

        Ok(records
            .iter()
            .zip(scored)
            .enumerate()
            .map(|(i, (record, (probability, decision)))| {
                let id = RecordId::for_row(record, row_offset + i);
                PredictionResult::new(id, probability, decision, threshold)
            })
            .collect())
    }
}

/// Heart-attack risk inference over patient records.
#[derive(Debug)]
pub struct InferencePipeline {
    config: PipelineConfig,
    state: OnceCell<PipelineState>,
}

impl InferencePipeline {
    /// Create a pipeline that loads its artifacts on first use.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: OnceCell::new(),
        }
    }

    /// Create a lazily loading pipeline configured from the environment.
    ///
    /// # Errors
    /// Returns `CardioRiskError::Validation` for an invalid configuration.
    pub fn from_env() -> Result<Self, CardioRiskError> {
        Ok(Self::new(PipelineConfig::from_env()?))
    }

    /// Create an already loaded pipeline from injected parts.
    ///
    /// # Errors
    /// Returns `CardioRiskError::ModelUnavailable` if the model's feature
    /// layout is not recognised, and `Validation` for a threshold outside
    /// [0, 1] or an invalid configuration.
    pub fn with_state(
        config: PipelineConfig,
        model: Box<dyn RiskModel>,
        fill_values: FillValueMap,
        threshold: f64,
    ) -> Result<Self, CardioRiskError> {
        config.validate()?;
        let state = PipelineState::new(model, fill_values, threshold, None)?;
        Ok(Self {
            config,
            state: OnceCell::with_value(state),
        })
    }

    /// Whether artifacts have been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.get().is_some()
    }

    /// Load artifacts now instead of on the first prediction.
    ///
    /// Loading happens at most once; concurrent callers wait for the single
    /// in-flight load. A failed load is not remembered, so a later call
    /// retries.
    ///
    /// # Errors
    /// Returns `CardioRiskError::ModelUnavailable` if the model artifact is
    /// missing, corrupt, or laid out for an unknown feature set.
    pub fn load(&self) -> Result<(), CardioRiskError> {
        self.state().map(|_| ())
    }

    fn state(&self) -> Result<&PipelineState, CardioRiskError> {
        self.state.get_or_try_init(|| self.load_state())
    }

    fn load_state(&self) -> Result<PipelineState, CardioRiskError> {
        tracing::info!("Loading inference pipeline state...");

        let loaded = load_model(&self.config.model_path).map_err(|e| {
            tracing::error!("Model unavailable: {e}");
            CardioRiskError::from(e)
        })?;
        let threshold =
            ThresholdStore::new(&self.config.threshold_path, self.config.default_threshold).load();
        let fill_values = FillValueStore::new(&self.config.fill_values_path).load();

        let state = PipelineState::new(loaded.model, fill_values, threshold, Some(loaded.sha256))
            .map_err(|e| {
                tracing::error!("Model at {:?} rejected: {e}", loaded.path);
                e
            })?;

        tracing::info!(
            "Pipeline ready: {} ({}), threshold {}",
            state.classifier.model().model_type(),
            state.classifier.feature_set(),
            state.classifier.threshold()
        );
        Ok(state)
    }

    /// The matrix the model sees for `records`: 25 base columns for a raw
    /// model, 43 columns for a feature-engineered one.
    ///
    /// # Errors
    /// Returns `ModelUnavailable` if the model cannot be loaded, and a `Row`
    /// error wrapping `TypeConversion` for an unconvertible value.
    pub fn transform(&self, records: &[Record]) -> Result<FeatureFrame, CardioRiskError> {
        self.state()?.features(records, 0)
    }

    /// Predict one record.
    ///
    /// # Errors
    /// Returns `ModelUnavailable` if the model cannot be loaded, and
    /// `TypeConversion` for an unconvertible value.
    pub fn predict_single(&self, record: &Record) -> Result<PredictionResult, CardioRiskError> {
        let state = self.state()?;
        let mut results = state
            .score(std::slice::from_ref(record), 0)
            .map_err(unwrap_row)?;
        results
            .pop()
            .ok_or_else(|| CardioRiskError::Validation("model returned no prediction".to_string()))
    }

    /// Predict a table of records, returning full results in input order.
    ///
    /// Every row is scored independently, so each result equals what
    /// `predict_single` returns for that row alone. Rows are processed in
    /// chunks of `batch_chunk_size`, chunks in parallel.
    ///
    /// # Errors
    /// Returns `ModelUnavailable` if the model cannot be loaded, and a `Row`
    /// error naming the first failing row position. When several rows fail,
    /// the lowest position is reported regardless of scheduling.
    pub fn predict_batch_detailed(
        &self,
        records: &[Record],
    ) -> Result<Vec<PredictionResult>, CardioRiskError> {
        let state = self.state()?;
        let chunk_size = self.config.batch_chunk_size.max(1);

        // Collect every chunk before short-circuiting so the earliest failure wins.
        let scored: Vec<_> = records
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(n, chunk)| state.score(chunk, n * chunk_size))
            .collect();
        let chunks = scored.into_iter().collect::<Result<Vec<_>, _>>()?;

        let results: Vec<PredictionResult> = chunks.into_iter().flatten().collect();
        tracing::debug!("Scored {} records in batch", results.len());
        Ok(results)
    }

    /// Predict a table of records, returning compact `{id, prediction,
    /// probability}` rows in input order.
    ///
    /// # Errors
    /// Same as [`Self::predict_batch_detailed`].
    pub fn predict_batch(
        &self,
        records: &[Record],
    ) -> Result<Vec<BatchPrediction>, CardioRiskError> {
        Ok(self
            .predict_batch_detailed(records)?
            .iter()
            .map(PredictionResult::to_batch)
            .collect())
    }

    /// Describe the model without loading it.
    #[must_use]
    pub fn model_info(&self) -> ModelInfo {
        let model_path = self.config.model_path.display().to_string();
        match self.state.get() {
            Some(state) => {
                let model = state.classifier.model();
                ModelInfo {
                    model_type: Some(model.model_type().to_string()),
                    model_path,
                    threshold: state.classifier.threshold(),
                    is_loaded: true,
                    version: Some(state.classifier.feature_set().version_label().to_string()),
                    n_estimators: model.n_estimators(),
                    max_depth: model.max_depth(),
                    model_sha256: state.model_sha256.clone(),
                    loaded_at: Some(state.loaded_at),
                }
            }
            None => ModelInfo {
                model_type: None,
                model_path,
                threshold: self.config.default_threshold,
                is_loaded: false,
                version: None,
                n_estimators: None,
                max_depth: None,
                model_sha256: None,
                loaded_at: None,
            },
        }
    }
}

/// A single record has no row context worth reporting.
fn unwrap_row(e: CardioRiskError) -> CardioRiskError {
    match e {
        CardioRiskError::Row { source, .. } => *source,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{self, BASE_FEATURES};
    use crate::domain::{FieldValue, RiskLevel};
    use crate::ports::ModelError;
    use ndarray::{Array1, ArrayView2};

    /// Probability is a fixed blend of a few base columns, so results are
    /// easy to predict and depend only on the row itself.
    struct BlendModel {
        names: Vec<String>,
    }

    impl BlendModel {
        fn boxed(feature_set: FeatureSet) -> Box<dyn RiskModel> {
            Box::new(Self {
                names: feature_set.columns().iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    impl RiskModel for BlendModel {
        fn model_type(&self) -> &str {
            "Blend"
        }

        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
            Ok(features
                .rows()
                .into_iter()
                .map(|row| (0.5 * row[0] + 0.25 * row[5] + 0.25 * row[3]).clamp(0.0, 1.0))
                .collect())
        }
    }

    fn pipeline(feature_set: FeatureSet) -> InferencePipeline {
        InferencePipeline::with_state(
            PipelineConfig::default(),
            BlendModel::boxed(feature_set),
            FillValueMap::builtin(),
            0.40,
        )
        .expect("Should build pipeline")
    }

    fn patient(age: f64, smoking: f64, diabetes: f64) -> Record {
        BASE_FEATURES
            .iter()
            .map(|c| (*c, FieldValue::Number(0.1)))
            .collect::<Record>()
            .with(schema::AGE, age)
            .with(schema::SMOKING, smoking)
            .with(schema::DIABETES, diabetes)
            .with(schema::GENDER, "Female")
    }

    #[test]
    fn test_predict_single_fields() {
        let result = pipeline(FeatureSet::Engineered)
            .predict_single(&patient(0.6, 1.0, 0.0))
            .expect("Should predict");

        // 0.5 * 0.6 + 0.25 * 1.0 + 0.25 * 0.0
        assert!((result.probability - 0.55).abs() < 1e-9);
        assert_eq!(result.prediction, 1);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.risk_percentage, "55.0%");
        assert!((result.threshold_used - 0.40).abs() < f64::EPSILON);
        assert_eq!(result.id, RecordId::Index(0));
    }

    #[test]
    fn test_batch_matches_single() {
        let pipeline = pipeline(FeatureSet::Engineered);
        let records: Vec<Record> = (0..7_i32)
            .map(|i| patient(f64::from(i) / 7.0, f64::from(i % 2), f64::from(i % 3 == 0)))
            .collect();

        let batch = pipeline.predict_batch(&records).expect("Should predict batch");
        assert_eq!(batch.len(), records.len());
        for (i, (row, record)) in batch.iter().zip(&records).enumerate() {
            let single = pipeline.predict_single(record).expect("Should predict");
            assert_eq!(row.prediction, single.prediction);
            assert_eq!(row.probability, single.probability);
            assert_eq!(row.id, RecordId::Index(i));
        }
    }

    #[test]
    fn test_chunk_boundaries_do_not_change_results() {
        let records: Vec<Record> = (0..10_i32)
            .map(|i| patient(f64::from(i) / 10.0, 0.0, 1.0))
            .collect();
        let whole = pipeline(FeatureSet::Raw)
            .predict_batch(&records)
            .expect("Should predict");

        let small = InferencePipeline::with_state(
            PipelineConfig {
                batch_chunk_size: 3,
                ..PipelineConfig::default()
            },
            BlendModel::boxed(FeatureSet::Raw),
            FillValueMap::builtin(),
            0.40,
        )
        .expect("Should build pipeline");
        let chunked = small.predict_batch(&records).expect("Should predict");

        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_ids_carried_through_or_positional() {
        let records = vec![
            patient(0.1, 0.0, 0.0).with("id", 9172.0),
            patient(0.2, 0.0, 0.0),
            patient(0.3, 0.0, 0.0).with("id", "p-3"),
        ];
        let batch = pipeline(FeatureSet::Raw)
            .predict_batch(&records)
            .expect("Should predict");

        assert_eq!(batch[0].id, RecordId::Integer(9172));
        assert_eq!(batch[1].id, RecordId::Index(1));
        assert_eq!(batch[2].id, RecordId::Text("p-3".into()));
    }

    #[test]
    fn test_incomplete_record_still_predicts() {
        let record = Record::new().with(schema::AGE, 0.9);
        let result = pipeline(FeatureSet::Engineered)
            .predict_single(&record)
            .expect("Should predict");
        assert!((result.probability - 0.45).abs() < 1e-9);
        assert_eq!(result.prediction, 1);
    }

    #[test]
    fn test_transform_layouts() {
        let records = vec![patient(0.5, 1.0, 1.0)];

        let raw = pipeline(FeatureSet::Raw).transform(&records).expect("Should transform");
        assert_eq!(raw.ncols(), 25);

        let engineered = pipeline(FeatureSet::Engineered)
            .transform(&records)
            .expect("Should transform");
        assert_eq!(engineered.ncols(), 43);
        assert_eq!(engineered.column("Smoking_Diabetes").expect("column")[0], 1.0);
    }

    #[test]
    fn test_conversion_error_names_row() {
        let records = vec![
            patient(0.1, 0.0, 0.0),
            patient(0.1, 0.0, 0.0).with(schema::DIET, "keto"),
        ];
        let pipeline = pipeline(FeatureSet::Raw);

        let err = pipeline.predict_batch(&records).expect_err("Should fail");
        assert!(matches!(err, CardioRiskError::Row { row: 1, .. }));

        let err = pipeline.predict_single(&records[1]).expect_err("Should fail");
        assert!(matches!(err, CardioRiskError::TypeConversion { .. }));
    }

    #[test]
    fn test_lowest_failing_row_is_reported() {
        let pipeline = InferencePipeline::with_state(
            PipelineConfig {
                batch_chunk_size: 2,
                ..PipelineConfig::default()
            },
            BlendModel::boxed(FeatureSet::Raw),
            FillValueMap::builtin(),
            0.40,
        )
        .expect("Should build pipeline");
        let records: Vec<Record> = (0..64)
            .map(|i| {
                let record = patient(0.1, 0.0, 0.0);
                if i == 5 || i > 40 {
                    record.with(schema::DIET, "keto")
                } else {
                    record
                }
            })
            .collect();

        for _ in 0..20 {
            let err = pipeline.predict_batch(&records).expect_err("Should fail");
            assert!(matches!(err, CardioRiskError::Row { row: 5, .. }));
        }
    }

    #[test]
    fn test_model_info_when_loaded() {
        let info = pipeline(FeatureSet::Engineered).model_info();
        assert!(info.is_loaded);
        assert_eq!(info.model_type.as_deref(), Some("Blend"));
        assert_eq!(info.version.as_deref(), Some("V2 (with Feature Engineering)"));
        assert!(info.loaded_at.is_some());
    }

    #[test]
    fn test_model_info_has_no_side_effects() {
        let temp = tempfile::tempdir().expect("tempdir");
        let pipeline = InferencePipeline::new(PipelineConfig::with_models_dir(temp.path()));

        let info = pipeline.model_info();
        assert!(!info.is_loaded);
        assert!(info.model_type.is_none());
        assert!((info.threshold - 0.40).abs() < f64::EPSILON);
        assert!(!pipeline.is_loaded());
    }

    #[test]
    fn test_missing_model_is_unavailable_until_fixed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let pipeline = InferencePipeline::new(PipelineConfig::with_models_dir(temp.path()));

        for _ in 0..2 {
            let err = pipeline
                .predict_single(&patient(0.1, 0.0, 0.0))
                .expect_err("Should fail");
            assert!(err.is_unavailable());
            assert!(!pipeline.is_loaded());
        }
    }

    #[test]
    fn test_empty_batch() {
        let batch = pipeline(FeatureSet::Raw).predict_batch(&[]).expect("Should predict");
        assert!(batch.is_empty());
    }
}
