use std::path::Path;

use webetl_core::MockDataConfig;

use super::*;
use crate::csv_io::read_products;

const HEADER: &str = "product_name,product_url,website_name,original_category,product_image,product_image_name,product_code,product_description,product_unit_price,product_currency,product_discount_percentage,product_total_orders,product_stock_quantity,product_total_ratings,product_overall_stars";

fn raw_file(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    std::fs::write(&path, body).unwrap();
    path
}

fn config(root: &Path, transforms: Vec<TransformStep>) -> PipelineConfig {
    PipelineConfig {
        input_directory: root.join("raw"),
        output_directory: root.join("staging"),
        final_output_directory: root.join("processed"),
        transforms,
        file_pattern: "*_products.csv".to_string(),
        mock_data: MockDataConfig {
            seed: Some(11),
            ..MockDataConfig::default()
        },
        ..PipelineConfig::default()
    }
}

fn all_steps() -> Vec<TransformStep> {
    vec![
        TransformStep::StandardizeCategories,
        TransformStep::RemoveDuplicates,
        TransformStep::GenerateMockData,
        TransformStep::SeperateTables,
    ]
}

#[test]
fn batch_run_reports_each_file_and_keeps_going() {
    let root = tempfile::tempdir().unwrap();
    let raw = root.path().join("raw");
    std::fs::create_dir_all(&raw).unwrap();
    raw_file(
        &raw,
        "abby_products.csv",
        &[
            "Opera,https://a.test/opera,abby,Bánh kem bơ,https://a.test/1.jpg|https://a.test/2.jpg,opera,,,450000,VND,0,10,50,0,0",
            "Opera,https://a.test/opera,abby,Bánh kem bơ,https://a.test/1.jpg,opera,,,450000,VND,0,10,50,0,0",
            "Latte,https://a.test/latte,abby,Coffee,,,,,0,VND,0,10,50,0,0",
        ],
    );
    raw_file(
        &raw,
        "broken_products.csv",
        &["Flan,https://b.test/flan,broken,,,,,,call us,VND,0,10,50,0,0"],
    );
    std::fs::write(raw.join("notes.csv"), "ignored").unwrap();

    let mut pipeline = TransformPipeline::new(config(root.path(), all_steps())).unwrap();
    let report = pipeline.run();

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.succeeded(), 1);
    let failed = report
        .files
        .iter()
        .find(|f| f.status == FileStatus::Error)
        .unwrap();
    assert!(failed.input.ends_with("broken_products.csv"));
    assert!(failed.message.as_deref().unwrap().contains("row 1"));

    let staged = read_products(&root.path().join("staging/abby_products.csv")).unwrap();
    assert_eq!(staged.len(), 2);
    assert_eq!(staged[0].category_name, "Cakes");
    assert_eq!(staged[0].product_code, "AB-CA-001");
    assert_eq!(staged[1].category_name, "Others");

    let tables = report.tables.expect("tables written");
    let products = std::fs::read_to_string(&tables.products).unwrap();
    assert_eq!(products.lines().count(), 3);
    let images = std::fs::read_to_string(&tables.product_images).unwrap();
    assert_eq!(images.lines().count(), 3);
}

#[test]
fn steps_not_configured_are_skipped() {
    let root = tempfile::tempdir().unwrap();
    let raw = root.path().join("raw");
    std::fs::create_dir_all(&raw).unwrap();
    let input = raw_file(
        &raw,
        "givral_products.csv",
        &[
            "Flan,https://g.test/flan,givral,Pudding,,,G-1,,25000,VND,0,10,50,0,0",
            "Flan,https://g.test/flan,givral,Pudding,,,G-1,,25000,VND,0,10,50,0,0",
        ],
    );

    let mut pipeline =
        TransformPipeline::new(config(root.path(), vec![TransformStep::RemoveDuplicates])).unwrap();
    let output = pipeline.run_file(&input).unwrap();

    let staged = read_products(&output).unwrap();
    assert_eq!(staged.len(), 1);
    assert!(staged[0].category_name.is_empty());
    assert_eq!(staged[0].product_code, "G-1");
    assert!(!root.path().join("processed").exists());
}

#[test]
fn single_file_failure_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let mut pipeline = TransformPipeline::new(config(root.path(), all_steps())).unwrap();
    let err = pipeline
        .run_file(&root.path().join("raw/absent_products.csv"))
        .unwrap_err();
    assert!(matches!(err, TransformError::Csv { .. }), "got: {err}");
}

#[test]
fn single_file_writes_its_own_tables() {
    let root = tempfile::tempdir().unwrap();
    let raw = root.path().join("raw");
    std::fs::create_dir_all(&raw).unwrap();
    let input = raw_file(
        &raw,
        "tousles_products.csv",
        &["Mocha,https://t.test/mocha,tousles,Coffee,https://t.test/m.jpg,,,,35000,VND,0,10,50,0,0"],
    );

    let mut pipeline = TransformPipeline::new(config(root.path(), all_steps())).unwrap();
    pipeline.run_file(&input).unwrap();

    let categories =
        std::fs::read_to_string(root.path().join("processed/categories.csv")).unwrap();
    assert_eq!(categories.lines().count(), 2);
}

#[test]
fn missing_config_uses_defaults() {
    let pipeline =
        TransformPipeline::from_config_path(Path::new("/nonexistent/etl_config.yml")).unwrap();
    assert_eq!(
        pipeline.config().transforms,
        PipelineConfig::default().transforms
    );
}

#[test]
fn empty_input_directory_is_an_empty_report() {
    let root = tempfile::tempdir().unwrap();
    let mut pipeline = TransformPipeline::new(config(root.path(), all_steps())).unwrap();
    let report = pipeline.run();
    assert!(report.files.is_empty());
    let tables = report.tables.expect("empty tables still written");
    assert!(tables.categories.exists());
}
