//! Parser runs against small bulletin files written to a temp directory.

use std::path::Path;

use chrono::NaiveDate;
use encoding_rs::SHIFT_JIS;
use tempfile::TempDir;

use idwr_core::{ParseOptions, SentinelLayout, parse_bullet, parse_dataset, parse_sentinel};
use idwr_model::{DatasetKind, DiseaseNameTracker, SourceTag, SurveillanceRecord};

const ENGLISH_SENTINEL: &str = "\
IDWR Sentinel,,,,,,
Sentinel-reporting diseases,\"4th week, 2025\",,,,,
Prefecture,Influenza,,RS virus infection,,Pharyngoconjunctival fever,
,Current week,Per sentinel,Current week,Per sentinel,Current week,Per sentinel
Total,9000,18.2,100,0.5,50,0.1
Hokkaido,\"1,794\",8.08,12,0.1,-,
Aomori,300,4.5,0,0.00,3,0.05
";

const JAPANESE_SENTINEL: &str = "\
定点当たり報告数,,,
2025年第4週,,,
,インフルエンザ,,COVID-19
,報告,定当,報告
総数,\"9,000\",20.0,10
北海道,\"1,794\",8.08,5
";

const BULLETIN: &str = "\
全数報告,,,,
2024,,,,
,,,,
,\"鳥インフルエンザ\nH5N1) (Avian influenza H5N1\",\"鳥インフルエンザ\nH5N1) (Avian influenza H5N1\",Measles,Measles
,当週,累積,当週,累積
Total No.,1,2,5,20
Hokkaido,1,1,0,3
Tokyo,,1,5,17
";

fn write_shift_jis(path: &Path, text: &str) {
    let (encoded, _, had_errors) = SHIFT_JIS.encode(text);
    assert!(!had_errors);
    std::fs::write(path, &encoded).unwrap();
}

fn find<'a>(records: &'a [SurveillanceRecord], pref: &str, disease: &str) -> &'a SurveillanceRecord {
    records
        .iter()
        .find(|r| r.prefecture == pref && r.disease == disease)
        .unwrap_or_else(|| panic!("no record for {pref}/{disease}"))
}

#[test]
fn english_sentinel_yields_one_row_per_prefecture_and_disease() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("teitenrui04.csv");
    std::fs::write(&path, ENGLISH_SENTINEL).unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let outcome = parse_sentinel(&path, &ParseOptions::new(), &mut tracker).unwrap();

    assert_eq!(outcome.records.len(), 6);
    assert!(outcome.skipped.is_empty());
    assert!(outcome.records.iter().all(|r| r.year == 2025 && r.week == 4));
    assert!(
        outcome
            .records
            .iter()
            .all(|r| r.date == NaiveDate::from_ymd_opt(2025, 1, 20))
    );
    assert!(
        outcome
            .records
            .iter()
            .all(|r| r.source == SourceTag::SentinelSurveillance)
    );

    let influenza = find(&outcome.records, "Hokkaido", "Influenza");
    assert_eq!(influenza.count, Some(1794));
    assert_eq!(influenza.per_sentinel, Some(8.08));

    let pcf = find(&outcome.records, "Hokkaido", "Pharyngoconjunctival fever");
    assert_eq!(pcf.count, None);
    assert_eq!(pcf.per_sentinel, None);
}

#[test]
fn japanese_sentinel_is_decoded_from_shift_jis() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("2025-04-teiten.csv");
    write_shift_jis(&path, JAPANESE_SENTINEL);

    let mut tracker = DiseaseNameTracker::new();
    let outcome = parse_sentinel(&path, &ParseOptions::new(), &mut tracker).unwrap();

    assert_eq!(outcome.records.len(), 2);
    let influenza = find(&outcome.records, "北海道", "インフルエンザ");
    assert_eq!(influenza.count, Some(1794));
    assert_eq!(influenza.per_sentinel, Some(8.08));
    assert_eq!((influenza.year, influenza.week), (2025, 4));
    assert_eq!(influenza.date, NaiveDate::from_ymd_opt(2025, 1, 20));

    let covid = find(&outcome.records, "北海道", "COVID-19");
    assert_eq!(covid.count, Some(5));
    assert_eq!(covid.per_sentinel, None);
}

#[test]
fn sentinel_directory_mixes_layouts() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("teitenrui04.csv"), ENGLISH_SENTINEL).unwrap();
    write_shift_jis(&dir.path().join("2025-04-teiten.csv"), JAPANESE_SENTINEL);
    std::fs::write(dir.path().join("teiten.csv"), ENGLISH_SENTINEL.replace("4th week, 2025", "")).unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let outcome = parse_sentinel(dir.path(), &ParseOptions::new(), &mut tracker).unwrap();
    assert_eq!(outcome.files_read, 2);
    assert_eq!(outcome.records.len(), 8);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].path.ends_with("teiten.csv"));
}

#[test]
fn english_week_filter_uses_the_title_week() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sentinel_rapid.csv");
    std::fs::write(&path, ENGLISH_SENTINEL).unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let everything = parse_sentinel(&path, &ParseOptions::new(), &mut tracker).unwrap();
    let week_four = parse_sentinel(&path, &ParseOptions::new().with_weeks([4]), &mut tracker).unwrap();
    assert_eq!(week_four.records.len(), everything.records.len());
    assert_eq!(week_four.records.len(), 6);
    assert!(week_four.records.iter().all(|r| r.week == 4));

    let week_five = parse_sentinel(&path, &ParseOptions::new().with_weeks([5]), &mut tracker).unwrap();
    assert!(week_five.records.is_empty());
    assert!(week_five.skipped.is_empty());
    assert_eq!(week_five.files_read, 0);
}

#[test]
fn english_disease_qualifiers_survive_parsing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("teitenrui04.csv");
    std::fs::write(
        &path,
        ENGLISH_SENTINEL.replace("RS virus infection", "Infectious gastroenteritis (only rotavirus)"),
    )
    .unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let outcome = parse_sentinel(&path, &ParseOptions::new(), &mut tracker).unwrap();
    let mut diseases: Vec<&str> = outcome.records.iter().map(|r| r.disease.as_str()).collect();
    diseases.sort_unstable();
    diseases.dedup();
    assert!(diseases.contains(&"Infectious gastroenteritis (only rotavirus)"));
    assert!(!diseases.contains(&"only rotavirus"));
}

#[test]
fn forced_layout_overrides_detection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("teitenrui04.csv");
    std::fs::write(&path, ENGLISH_SENTINEL).unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let options = ParseOptions::new().with_sentinel_layout(SentinelLayout::Japanese);
    let outcome = parse_sentinel(&path, &options, &mut tracker).unwrap();
    // The Japanese layout takes the year from the file name only.
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, "no year in file name");
}

#[test]
fn sentinel_year_argument_overrides_title() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("teitenrui04.csv");
    std::fs::write(&path, ENGLISH_SENTINEL).unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let options = ParseOptions::new().with_year(2024);
    let outcome = parse_sentinel(&path, &options, &mut tracker).unwrap();
    assert!(outcome.records.iter().all(|r| r.year == 2024));
    assert_eq!(outcome.records[0].date, NaiveDate::from_ymd_opt(2024, 1, 22));
}

#[test]
fn bulletin_normalizes_split_parentheticals() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("2024-05-zensu.csv"), BULLETIN).unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let outcome = parse_bullet(dir.path(), &ParseOptions::new(), &mut tracker).unwrap();

    assert_eq!(outcome.records.len(), 6);
    let h5n1 = find(&outcome.records, "Hokkaido", "Avian influenza H5N1");
    assert_eq!(h5n1.count, Some(1));
    assert_eq!((h5n1.year, h5n1.week), (2024, 5));
    assert_eq!(h5n1.date, NaiveDate::from_ymd_opt(2024, 2, 4));
    assert_eq!(find(&outcome.records, "Tokyo", "Avian influenza H5N1").count, Some(0));
    assert_eq!(find(&outcome.records, "Tokyo", "Measles").count, Some(5));
    assert_eq!(
        tracker.get("H5N1) (Avian influenza H5N1"),
        Some("Avian influenza H5N1")
    );
}

#[test]
fn registry_dispatches_by_kind() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("2024-05-zensu.csv"), BULLETIN).unwrap();

    let mut tracker = DiseaseNameTracker::new();
    let outcome =
        parse_dataset(DatasetKind::Bullet, dir.path(), &ParseOptions::new(), &mut tracker)
            .unwrap();
    assert_eq!(outcome.kind, DatasetKind::Bullet);
    let frame = outcome.to_frame().unwrap();
    assert_eq!(frame.height(), 6);
    assert_eq!(frame.width(), DatasetKind::Bullet.columns().len());
}

#[test]
fn missing_sex_workbook_directory_is_an_error() {
    let mut tracker = DiseaseNameTracker::new();
    let result = parse_dataset(
        DatasetKind::Sex,
        Path::new("/nonexistent/idwr"),
        &ParseOptions::new(),
        &mut tracker,
    );
    assert!(result.is_err());
}
