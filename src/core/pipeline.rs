use crate::core::dedup::DuplicateScorer;
use crate::core::parser::parse_client_export;
use crate::core::report::{render_report, TIMESTAMP_FORMAT};
use crate::core::{ClientRecord, ConfigProvider, DedupResult, Pipeline, Storage};
use crate::domain::model::DuplicatePair;
use crate::utils::error::Result;
use chrono::Datelike;
use tokio::io::AsyncWriteExt;

pub const STDOUT_TARGET: &str = "<stdout>";

pub struct DedupPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DedupPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn score(&self, scorer: &DuplicateScorer, records: &[ClientRecord]) -> Vec<DuplicatePair> {
        if self.config.parallel() {
            #[cfg(feature = "parallel")]
            {
                tracing::debug!("Scoring pairs on the rayon thread pool");
                return scorer.find_duplicates_parallel(records);
            }
            #[cfg(not(feature = "parallel"))]
            {
                tracing::warn!("Built without the `parallel` feature, scoring sequentially");
            }
        }
        scorer.find_duplicates(records)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DedupPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<ClientRecord>> {
        tracing::debug!("Reading client export from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        let current_year = chrono::Local::now().year();
        parse_client_export(&data, current_year)
    }

    async fn transform(&self, records: Vec<ClientRecord>) -> Result<DedupResult> {
        let invalid = records.iter().filter(|r| r.is_invalid()).count();
        tracing::info!("Validation: {} of {} records have errors", invalid, records.len());

        let scorer = DuplicateScorer::new(self.config.threshold());
        let pair_count = records.len() * records.len().saturating_sub(1) / 2;
        tracing::debug!(
            "Scoring {} pairs (threshold {})",
            pair_count,
            scorer.threshold()
        );

        let duplicates = self.score(&scorer, &records);
        let fuzzy_comparisons = scorer.fuzzy_comparisons();

        tracing::info!("No. of fuzzy matches: {}", fuzzy_comparisons);
        tracing::info!("Possible duplicates: {}", duplicates.len());

        Ok(DedupResult {
            records,
            duplicates,
            fuzzy_comparisons,
        })
    }

    async fn load(&self, result: DedupResult) -> Result<String> {
        let generated = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let report = render_report(&result, self.config.report_format(), &generated)?;

        match self.config.output_path() {
            Some(path) => {
                tracing::debug!("Writing {} byte report to {}", report.len(), path);
                self.storage.write_file(path, &report).await?;
                Ok(path.to_string())
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&report).await?;
                stdout.flush().await?;
                Ok(STDOUT_TARGET.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ReportFormat;
    use crate::utils::error::DedupError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const EXPORT: &str = "System Client ID,Agency Client Reference,\"Surname, Forename\",Gender,NI Number,Home Office Reference,Mobile Number,Main E-Mail Address,Postcode,Date of Birth,Number of Cases
1,1001,\"Smith, John\",Male,,,,,SO14 7AB,,2
2,1002,\"Smith, Jon\",Male,,,,,SO14 7AB,,1
3,1003,\"Jones, Mary\",Female,AB123456C,,,,,,0
4,,\"Patel, Ravi\",Unknown,,,,,,,0
";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DedupError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        output_path: Option<String>,
        threshold: f64,
        format: ReportFormat,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                input_path: "export.csv".to_string(),
                output_path: Some("report.csv".to_string()),
                threshold: 0.3,
                format: ReportFormat::Csv,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> Option<&str> {
            self.output_path.as_deref()
        }

        fn threshold(&self) -> f64 {
            self.threshold
        }

        fn report_format(&self) -> ReportFormat {
            self.format
        }

        fn parallel(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_extract_reads_all_rows() {
        let pipeline = DedupPipeline::new(MockStorage::with_file("export.csv", EXPORT), MockConfig::new());

        let records = pipeline.extract().await.unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[1].search_name, "Jon Smith");
        assert!(records[3].is_invalid());
    }

    #[tokio::test]
    async fn test_extract_missing_input() {
        let pipeline = DedupPipeline::new(MockStorage::with_file("other.csv", EXPORT), MockConfig::new());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, DedupError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_scores_pairs() {
        let pipeline = DedupPipeline::new(MockStorage::with_file("export.csv", EXPORT), MockConfig::new());

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();

        assert_eq!(result.invalid_count(), 1);
        // 「Smith, John」與「Smith, Jon」：郵遞區號相同，姓名比例 95
        assert_eq!(result.duplicates.len(), 1);
        let pair = &result.duplicates[0];
        assert_eq!((pair.system_id_1, pair.system_id_2), (1, 2));
        assert_eq!(pair.score_percent, 63);
        assert_eq!(pair.reasons, "Postcode, Name");
    }

    #[tokio::test]
    async fn test_raising_threshold_drops_pairs() {
        let mut config = MockConfig::new();
        config.threshold = 0.7;
        let pipeline = DedupPipeline::new(MockStorage::with_file("export.csv", EXPORT), config);

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();

        assert!(result.duplicates.is_empty());
    }

    #[tokio::test]
    async fn test_load_writes_report_to_storage() {
        let storage = MockStorage::with_file("export.csv", EXPORT);
        let pipeline = DedupPipeline::new(storage.clone(), MockConfig::new());

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();
        let output = pipeline.load(result).await.unwrap();

        assert_eq!(output, "report.csv");
        let report = String::from_utf8(storage.get_file("report.csv").await.unwrap()).unwrap();
        assert!(report.contains("\"Validation errors\",1,\"No. records\",4"));
        assert!(report.contains("1,1001,2,1002,2,1,63,\"Postcode, Name\""));
    }

    #[tokio::test]
    async fn test_load_json_report() {
        let storage = MockStorage::with_file("export.csv", EXPORT);
        let mut config = MockConfig::new();
        config.output_path = Some("report.json".to_string());
        config.format = ReportFormat::Json;
        let pipeline = DedupPipeline::new(storage.clone(), config);

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();
        pipeline.load(result).await.unwrap();

        let bytes = storage.get_file("report.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["total_records"], 4);
        assert_eq!(value["duplicates"].as_array().unwrap().len(), 1);
    }
}
