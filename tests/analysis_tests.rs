use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::{tempdir, TempDir};

use vital_stats::{
    fit_model, load_table, predict, save_table, Analysis, Column, Error, OutlierPolicy,
    ThresholdMode,
};

const HEADER: &str = "ID,Year,Month,StateRegistrationOfBirth,NumberOfBirthCertificatesForBoys,\
NumberOfBirthCertificatesForGirls,StateRegistrationOfDeath,StateRegistrationOfMarriage,\
StateRegistrationOfDivorce,StateRegistrationOfPaternityExamination,StateRegistrationOfAdoption,\
StateRegistrationOfNameChange,TotalPopulationThisYear";

fn temp_dir() -> TempDir {
    tempdir().unwrap()
}

// Two years of months. Row 13 has a birth count far below the rest and row 20 an unusually
// deadly month; every `missing` row leaves its adoptions cell empty.
fn write_csv(dir: &TempDir, missing: &[u64]) -> PathBuf {
    let mut csv = String::from(HEADER);
    csv.push('\n');

    for i in 0..24u64 {
        let marriages = 3000 + 150 * ((i * 7) % 24);
        let births = if i == 12 { 10 } else { 9800 + marriages / 5 + (i % 3) * 7 };
        let deaths = if i == 19 { 25_000 } else { 10_000 + (i * 11) % 13 * 20 };
        let adoptions = if missing.contains(&(i + 1)) {
            String::new()
        } else {
            (80 + (i * 3) % 7).to_string()
        };
        let other = 500 + (i * 13) % 17;

        writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            i + 1,
            2010 + i / 12,
            i % 12 + 1,
            births,
            births / 2,
            births - births / 2,
            deaths,
            marriages,
            2500 + (i * 5) % 11 * 10,
            other,
            adoptions,
            other + 100,
            11_500_000 + (i / 12) * 100_000
        )
        .unwrap();
    }

    let path = dir.path().join("records.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn full_run_writes_json_and_filtered_csv() {
    let dir = temp_dir();
    let input = write_csv(&dir, &[]);
    let json_path = dir.path().join("out.json");
    let filtered_path = dir.path().join("filtered.csv");

    let table = load_table(&input).unwrap();
    let output = Analysis::default()
        .json_output(&json_path)
        .filtered_output(&filtered_path)
        .run(&table)
        .unwrap();

    assert_eq!(output.records_in, 24);
    assert_eq!(output.records_out, 22);
    assert!(output.filtered.iter().all(|r| r.id != 13 && r.id != 20));

    let json = read_json(&json_path);
    assert_eq!(json["records_out"], 22);
    assert_eq!(json["models"].as_array().unwrap().len(), 2);
    assert!(json.get("filtered").is_none());

    let filtered = load_table(&filtered_path).unwrap();
    assert_eq!(filtered, output.filtered);
}

#[test]
fn cascading_run_removes_at_least_as_much() {
    let dir = temp_dir();
    let table = load_table(&write_csv(&dir, &[])).unwrap();

    let frozen = Analysis::default().run(&table).unwrap();
    let cascading = Analysis::default()
        .threshold_mode(ThresholdMode::Cascading)
        .run(&table)
        .unwrap();

    assert!(cascading.records_out <= frozen.records_out);
    assert_eq!(cascading.column_stats, frozen.column_stats);
}

#[test]
fn policy_from_json_file() {
    let dir = temp_dir();
    let table = load_table(&write_csv(&dir, &[])).unwrap();
    let policy_path = dir.path().join("policy.json");
    fs::write(
        &policy_path,
        r#"{"rules": [{"column": "deaths", "remove_below": false, "remove_above": true}]}"#,
    )
    .unwrap();

    let policy = OutlierPolicy::load(&policy_path).unwrap();
    let output = Analysis::default().policy(policy).run(&table).unwrap();

    assert_eq!(output.records_out, 23);
    assert_eq!(output.filter_steps.len(), 1);
    assert_eq!(output.filter_steps[0].column, Column::Deaths);
    assert!(output.filtered.iter().any(|r| r.id == 13));
}

#[test]
fn missing_cells_are_dropped_or_filled() {
    let dir = temp_dir();
    let table = load_table(&write_csv(&dir, &[2, 5])).unwrap();
    assert_eq!(table.records()[1].adoptions, None);

    let dropped = fit_model(&table, "births", &["divorces", "adoptions"]).unwrap();
    assert_eq!(dropped.observations(), 22);

    let filled = vital_stats::fill_missing(&table);
    let model = fit_model(&filled, "births", &["divorces", "adoptions"]).unwrap();
    assert_eq!(model.observations(), 24);
    assert!(predict(&model, &[2500., 80.]).unwrap().is_finite());
}

#[test]
fn saved_table_loads_back() {
    let dir = temp_dir();
    let table = load_table(&write_csv(&dir, &[7])).unwrap();
    let copy = dir.path().join("copy.csv");

    save_table(&table, &copy).unwrap();

    assert_eq!(load_table(&copy).unwrap(), table);
}

#[test]
fn unwritable_outputs_do_not_fail_the_run() {
    let dir = temp_dir();
    let table = load_table(&write_csv(&dir, &[])).unwrap();
    let nowhere = dir.path().join("missing").join("out.json");

    let output = Analysis::default().json_output(&nowhere).run(&table);

    assert!(output.is_ok());
    assert!(!nowhere.exists());
}

#[test]
fn missing_input_is_an_access_error() {
    let dir = temp_dir();

    match load_table(&dir.path().join("nope.csv")) {
        Err(Error::AccessError { path, .. }) => assert!(path.ends_with("nope.csv")),
        other => panic!("unexpected {:?}", other.map(|t| t.len())),
    }
}
