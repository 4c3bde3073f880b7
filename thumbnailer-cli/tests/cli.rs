use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use imageproc::image::{codecs::png::PngEncoder, Rgba, RgbaImage};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 255]));
    let mut buffer = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut buffer)).unwrap();
    buffer
}

fn write_event(dir: &Path, bucket: &str, key: &str) -> std::path::PathBuf {
    let path = dir.join("event.json");
    let event = format!(
        r#"{{ "Records": [ {{ "s3": {{ "bucket": {{ "name": "{bucket}" }}, "object": {{ "key": "{key}" }} }} }} ] }}"#
    );
    fs::write(&path, event).unwrap();
    path
}

fn run(store: &Path, event: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_thumbnailer-cli"))
        .arg("--store")
        .arg(store)
        .arg(event)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn prints_ok_after_upload() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(store.join("photos")).unwrap();
    fs::create_dir_all(store.join("photos-resized")).unwrap();
    fs::write(store.join("photos/cat.png"), png_bytes(400, 200)).unwrap();
    let event = write_event(dir.path(), "photos", "cat.png");

    let output = run(&store, &event);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Ok\n");
    assert!(store.join("photos-resized/resized-cat.png").is_file());
}

#[test]
fn prints_empty_line_on_skip() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(store.join("photos")).unwrap();
    let event = write_event(dir.path(), "photos", "notes.txt");

    let output = run(&store, &event);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "\n");
}

#[test]
fn rejected_upload_logs_and_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(store.join("photos")).unwrap();
    fs::write(store.join("photos/cat.png"), png_bytes(64, 64)).unwrap();
    let event = write_event(dir.path(), "photos", "cat.png");

    let output = run(&store, &event);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "{stderr}");
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("ERROR"), "{stderr}");
    assert!(stderr.contains("NoSuchBucket"), "{stderr}");
    assert!(stderr.contains("photos-resized/resized-cat.png"), "{stderr}");
    assert!(!stderr.contains("Thumbnail failed after stage"), "{stderr}");
}

#[test]
fn missing_source_reports_the_stage() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(store.join("photos")).unwrap();
    fs::create_dir_all(store.join("photos-resized")).unwrap();
    let event = write_event(dir.path(), "photos", "gone.png");

    let output = run(&store, &event);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Thumbnail failed after stage `validated`"), "{stderr}");
    assert!(!store.join("photos-resized/resized-gone.png").exists());
}
