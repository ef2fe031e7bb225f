use curvelet_cli::{build_dataset, inspect_image, Settings};
use dataset_builder::{EntryOrder, Label, RunSummary};
use image::{GrayImage, Luma};
use std::fs;
use std::path::Path;

fn write_image(path: &Path, seed: u32) {
    GrayImage::from_fn(40, 40, |x, y| Luma([((x * seed + y * 7) % 256) as u8]))
        .save(path)
        .unwrap();
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.transform.canonical_size = 64;
    settings.dataset.order = EntryOrder::Name;
    settings
}

#[test]
fn inspect_reports_layout_and_features() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_image(&path, 3);

    let inspection = inspect_image(&settings(), &path).unwrap();
    assert_eq!(inspection.layout, vec![1, 16, 1]);
    assert_eq!(inspection.features.len(), 12);
    assert!(inspection.features.has_symmetry);
}

#[test]
fn inspect_rejects_unreadable_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    fs::write(&path, b"\xff\xd8 truncated").unwrap();

    let err = inspect_image(&settings(), &path).unwrap_err();
    assert!(err.to_string().contains("failed to decompose"));
}

#[tokio::test]
async fn build_with_workers_writes_table_and_summary() {
    let root = tempfile::tempdir().unwrap();
    let mut settings = settings();
    settings.run.workers = 2;
    settings.run.summary = Some(root.path().join("summary.json"));

    for (label, names) in [
        (Label::Authentic, ["a1.png", "a2.png"]),
        (Label::Synthetic, ["s1.png", "s2.png"]),
    ] {
        let dir = settings.builder_config(root.path()).corpus.label_dir(label);
        fs::create_dir_all(&dir).unwrap();
        for (i, name) in names.iter().enumerate() {
            write_image(&dir.join(name), i as u32 + label.as_int() as u32 * 5 + 1);
        }
    }

    let output = root.path().join("dataset.csv");
    let report = build_dataset(&settings, root.path(), &output).await.unwrap();
    assert_eq!(report.summary.succeeded, 4);

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 5);

    let summary: RunSummary =
        serde_json::from_str(&fs::read_to_string(root.path().join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.output.as_deref(), Some(output.as_path()));
}
