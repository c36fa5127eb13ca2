use anyhow::Result;
use apdups::core::ReportFormat;
use apdups::{DedupEngine, DedupError, DedupPipeline, LocalStorage, RunConfig};
use tempfile::TempDir;

const HEADER: &str = "System Client ID,Agency Client Reference,\"Surname, Forename\",Gender,NI Number,Home Office Reference,Mobile Number,Main E-Mail Address,Postcode,Date of Birth,Number of Cases";

fn write_export(dir: &TempDir, rows: &[&str]) -> Result<String> {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    let path = dir.path().join("clients.csv");
    std::fs::write(&path, content)?;
    Ok(path.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_end_to_end_csv_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_export(
        &temp_dir,
        &[
            "1,1001,\"Smith, John\",Male,,,,,SO14 7AB,,2",
            "2,1002,\"Smith, Jon\",Male,,,,,SO14 7AB,,1",
            "3,1003,\"Jones, Mary\",Female,AB123456C,,07700 900123,mary@example.com,,14/05/1975,4",
            "4,1004,\"Jones, Marie\",Female,,,+447700900123,MARY@example.com,,,0",
            "5,abc,\"Patel, Ravi\",Male,QQ,,,,,,1",
        ],
    )?;
    let output = temp_dir.path().join("out/report.csv");

    let mut config = RunConfig::new(input);
    config.output_path = Some(output.to_str().unwrap().to_string());

    let engine = DedupEngine::new(DedupPipeline::new(LocalStorage::default(), config));
    let written = engine.run().await?;

    assert_eq!(written, output.to_str().unwrap());
    let report = std::fs::read_to_string(&output)?;
    let lines: Vec<&str> = report.lines().collect();

    assert!(lines[0].starts_with("\"Report generated\","));
    assert_eq!(lines[1], "\"Validation errors\",1,\"No. records\",5");
    assert!(report.contains("5,0,\"Agency Client Reference\",\"abc\",\"Not a number\",1"));
    assert!(report.contains("5,0,\"NI Number\",\"QQ\",\"Invalid length\",1"));

    // 同一支手機與 email：16 分，上限 10
    assert!(report.contains("3,1003,4,1004,4,0,100,\"Mobile number, Email\""));
    // 郵遞區號 1 分，姓名比例 95：95 * 2 / 300
    assert!(report.contains("1,1001,2,1002,2,1,63,\"Postcode, Name\""));

    let duplicates_at = lines
        .iter()
        .position(|l| *l == "\"Possible duplicates\"")
        .expect("duplicate section");
    assert_eq!(lines.len() - duplicates_at - 2, 2);
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_json_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_export(
        &temp_dir,
        &[
            "10,2001,\"Smith, John\",[Not Specified],,,,,,,0",
            "11,2001,\"Brown, Alice\",Female,,,,,,,3",
        ],
    )?;
    let output = temp_dir.path().join("report.json");

    let mut config = RunConfig::new(input);
    config.output_path = Some(output.to_str().unwrap().to_string());
    config.format = ReportFormat::Json;

    DedupEngine::new(DedupPipeline::new(LocalStorage::default(), config))
        .run()
        .await?;

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    assert_eq!(value["total_records"], 2);
    assert_eq!(value["invalid_records"], 0);
    assert_eq!(value["fuzzy_comparisons"], 0);
    assert_eq!(value["duplicates"][0]["system_id_1"], 10);
    assert_eq!(value["duplicates"][0]["system_id_2"], 11);
    assert_eq!(value["duplicates"][0]["score_percent"], 100);
    assert_eq!(value["duplicates"][0]["reasons"], "Agency Client Reference");
    Ok(())
}

#[tokio::test]
async fn test_wrong_header_aborts_without_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("clients.csv");
    std::fs::write(&input, "Id,Name\n1,Smith\n")?;
    let output = temp_dir.path().join("report.csv");

    let mut config = RunConfig::new(input.to_str().unwrap());
    config.output_path = Some(output.to_str().unwrap().to_string());

    let result = DedupEngine::new(DedupPipeline::new(LocalStorage::default(), config))
        .run()
        .await;

    assert!(matches!(result, Err(DedupError::HeaderMismatch { .. })));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_input_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = RunConfig::new(temp_dir.path().join("missing.csv").to_str().unwrap());

    let result = DedupEngine::new(DedupPipeline::new(LocalStorage::default(), config))
        .run()
        .await;

    assert!(matches!(result, Err(DedupError::IoError(_))));
}
