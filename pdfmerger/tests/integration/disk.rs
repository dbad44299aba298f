//! Reading inputs from disk and writing the result back.

use pdfmerger::Session;
use pdfmerger::config::OverwriteMode;
use pdfmerger::error::MergerError;
use pdfmerger::io::{DiskSaver, FileSaver, InputReader};
use pdfmerger::model::Mode;
use pdfmerger::utils::collect_paths_for_patterns;
use tempfile::TempDir;

use crate::common::{markers, marked_pdf, png};

fn write_inputs(dir: &TempDir) {
    std::fs::write(dir.path().join("01-cover.png"), png(20, 20, false)).unwrap();
    std::fs::write(dir.path().join("02-body.pdf"), marked_pdf("body", 2)).unwrap();
    std::fs::write(dir.path().join("03-end.pdf"), marked_pdf("end", 1)).unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"not an input").unwrap();
}

#[tokio::test]
async fn test_merge_files_from_disk() {
    let dir = TempDir::new().unwrap();
    write_inputs(&dir);

    let patterns = [
        format!("{}/*.png", dir.path().display()),
        format!("{}/*.pdf", dir.path().display()),
    ];
    let paths = collect_paths_for_patterns(&patterns).unwrap();
    let (inputs, stats) = InputReader::new().read_all(&paths, 2).await.unwrap();
    assert_eq!(stats.file_count, 3);

    let session = Session::default();
    session.ingest(inputs).await.unwrap();
    let output = session.merge().await.unwrap();

    let out_dir = dir.path().join("out");
    let saver = DiskSaver::new(Some(out_dir.join("")));
    let path = saver
        .save(&output.bytes, output.media_type, &output.filename)
        .await
        .unwrap();

    assert_eq!(path, out_dir.join("merged-document.pdf"));
    let written = std::fs::read(&path).unwrap();
    assert_eq!(markers(&written), vec!["", "body 1", "body 2", "end 1"]);
}

#[tokio::test]
async fn test_unknown_extension_is_unsupported() {
    let dir = TempDir::new().unwrap();
    write_inputs(&dir);

    let paths = vec![dir.path().join("02-body.pdf"), dir.path().join("readme.txt")];
    let (inputs, _) = InputReader::new().read_all(&paths, 2).await.unwrap();

    let session = Session::default();
    let err = session.ingest(inputs).await.unwrap_err();
    assert!(matches!(err, MergerError::UnsupportedFormat { .. }));
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_extracted_output_keeps_source_name() {
    let dir = TempDir::new().unwrap();
    write_inputs(&dir);

    let input = InputReader::new()
        .read(&dir.path().join("02-body.pdf"))
        .await
        .unwrap();

    let session = Session::default();
    session.set_mode(Mode::Extractor).unwrap();
    session.extract(input).await.unwrap();
    let ids = session.ids();
    session.reorder(&ids[1], &ids[0]).unwrap();
    let output = session.save_extracted().await.unwrap();

    let saver = DiskSaver::new(Some(dir.path().to_path_buf()));
    let stats = saver
        .save_with_stats(&output.bytes, output.media_type, &output.filename)
        .await
        .unwrap();
    assert_eq!(stats.output_path, dir.path().join("extracted-02-body.pdf"));

    let again = saver
        .save(&output.bytes, output.media_type, &output.filename)
        .await
        .unwrap_err();
    assert!(matches!(again, MergerError::OutputExists { .. }));

    let forced = saver.overwrite(OverwriteMode::Force);
    let path = forced
        .save(&output.bytes, output.media_type, &output.filename)
        .await
        .unwrap();
    assert_eq!(
        markers(&std::fs::read(path).unwrap()),
        vec!["body 2", "body 1"]
    );
}
