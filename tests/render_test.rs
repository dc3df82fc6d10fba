use eml_itinerary::*;
use std::fs;
use std::path::Path;

const BOOKING_EML: &[u8] = include_bytes!("fixtures/two_segment_booking.eml");

fn document() -> StructuredDocument {
    Converter::new(Composer::default(), HtmlRenderer)
        .document_from_bytes(BOOKING_EML)
        .unwrap()
}

/// Names left in `dir`, staging files included
fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// --- HtmlRenderer ---

#[test]
fn test_html_renderer_writes_markup() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("booking.html");

    let written = HtmlRenderer.render(&document(), &destination).unwrap();
    assert_eq!(written, destination);

    let html = fs::read_to_string(&destination).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("NH 106"));
    assert_eq!(entries(dir.path()), ["booking.html"]);
}

#[test]
fn test_html_renderer_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("booking.html");
    fs::write(&destination, "stale").unwrap();

    HtmlRenderer.render(&document(), &destination).unwrap();
    assert_ne!(fs::read_to_string(&destination).unwrap(), "stale");
}

#[test]
fn test_html_renderer_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("missing").join("booking.html");

    let err = HtmlRenderer.render(&document(), &destination).unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
    assert!(!destination.exists());
}

// --- CommandRenderer ---

#[test]
fn test_weasyprint_defaults() {
    let renderer = CommandRenderer::default();
    assert_eq!(renderer, CommandRenderer::weasyprint());
    assert_eq!(renderer.program(), "weasyprint");
    assert_eq!(renderer.extension(), "pdf");
}

#[test]
fn test_missing_program_is_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("booking.pdf");
    let renderer = CommandRenderer::new("eml-itinerary-no-such-renderer", ["{input}", "{output}"]);

    let err = renderer.render(&document(), &destination).unwrap_err();
    assert!(matches!(err, RenderError::Spawn { .. }));
    assert!(entries(dir.path()).is_empty());
}

#[cfg(unix)]
#[test]
fn test_command_renderer_substitutes_paths() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("booking.pdf");
    let renderer = CommandRenderer::new("sh", ["-c", r#"cp "$0" "$1""#, "{input}", "{output}"]);

    let written = renderer.render(&document(), &destination).unwrap();
    assert_eq!(written, destination);

    let copied = fs::read_to_string(&destination).unwrap();
    assert!(copied.contains("flight-card"));
    assert_eq!(entries(dir.path()), ["booking.pdf"]);
}

#[cfg(unix)]
#[test]
fn test_failing_backend_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("booking.pdf");
    let renderer = CommandRenderer::new("sh", ["-c", "echo broken >&2; exit 3"]);

    let err = renderer.render(&document(), &destination).unwrap_err();
    match err {
        RenderError::Backend { program, stderr, .. } => {
            assert_eq!(program, "sh");
            assert_eq!(stderr, "broken");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
    assert!(entries(dir.path()).is_empty());
}

#[cfg(unix)]
#[test]
fn test_empty_output_is_failure() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("booking.pdf");
    let renderer = CommandRenderer::new("true", Vec::<String>::new());

    let err = renderer.render(&document(), &destination).unwrap_err();
    assert!(matches!(err, RenderError::Backend { .. }));
    assert!(!destination.exists());
}

// --- Batch ---

#[test]
fn test_batch_continues_after_failure() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let good = input_dir.path().join("good.eml");
    fs::write(&good, BOOKING_EML).unwrap();
    let missing = input_dir.path().join("missing.eml");
    let also_good = input_dir.path().join("also_good.eml");
    fs::write(&also_good, BOOKING_EML).unwrap();

    let converter = Converter::new(Composer::default(), HtmlRenderer);
    let out = output_dir.path().to_path_buf();
    let report = converter.convert_batch(vec![missing.clone(), good, also_good], |input| {
        out.join(input.file_name().unwrap()).with_extension("html")
    });

    assert_eq!(report.total(), 3);
    assert_eq!(report.converted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0], ConvertError::Read { .. }));
    assert_eq!(report.failed[0].path(), &missing);
    assert_eq!(entries(output_dir.path()), ["also_good.html", "good.html"]);
}

#[test]
fn test_convert_file_reports_render_failure() {
    let input_dir = tempfile::tempdir().unwrap();
    let input = input_dir.path().join("booking.eml");
    fs::write(&input, BOOKING_EML).unwrap();
    let destination = input_dir.path().join("nowhere").join("booking.html");

    let converter = Converter::new(Composer::default(), HtmlRenderer);
    let err = converter.convert_file(&input, &destination).unwrap_err();
    assert!(matches!(err, ConvertError::Render { .. }));
    assert_eq!(err.path(), &input);
}
