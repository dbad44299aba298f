//! Merging documents end to end through a session.

use pdfmerger::Session;
use pdfmerger::error::MergerError;
use pdfmerger::model::InputFile;

use crate::common::{draws_image, jpeg, markers, pdf_input, png_input};

#[tokio::test]
async fn test_pdf_and_image_merge_into_four_pages() {
    let session = Session::default();
    let added = session
        .ingest(vec![pdf_input("A.pdf", 3), png_input("B.png")])
        .await
        .unwrap();
    assert_eq!(added, 2);

    let documents = session.documents();
    assert_eq!(documents[0].page_count, 3);
    assert_eq!(documents[1].page_count, 1);

    let output = session.merge().await.unwrap();
    assert_eq!(output.filename, "merged-document.pdf");
    assert_eq!(output.page_count, 4);
    assert_eq!(markers(&output.bytes), vec!["A 1", "A 2", "A 3", ""]);
    assert!(draws_image(&output.bytes, 3));
}

#[tokio::test]
async fn test_page_count_is_sum_in_collection_order() {
    let session = Session::default();
    session
        .ingest(vec![
            pdf_input("x.pdf", 2),
            pdf_input("y.pdf", 1),
            pdf_input("z.pdf", 4),
        ])
        .await
        .unwrap();

    let ids = session.ids();
    assert!(session.reorder(&ids[2], &ids[0]).unwrap());

    let output = session.merge().await.unwrap();
    assert_eq!(output.page_count, 7);
    assert_eq!(
        markers(&output.bytes),
        vec!["z 1", "z 2", "z 3", "z 4", "x 1", "x 2", "y 1"]
    );
}

#[tokio::test]
async fn test_merge_does_not_consume_collection() {
    let session = Session::default();
    session.ingest(vec![pdf_input("a.pdf", 2)]).await.unwrap();

    let first = session.merge().await.unwrap();
    let second = session.merge().await.unwrap();
    assert_eq!(session.len(), 1);
    assert_eq!(markers(&first.bytes), markers(&second.bytes));
}

#[tokio::test]
async fn test_unsupported_input_fails_whole_batch() {
    let session = Session::default();
    session.ingest(vec![pdf_input("keep.pdf", 1)]).await.unwrap();
    let before = session.ids();

    let err = session
        .ingest(vec![
            pdf_input("good.pdf", 2),
            InputFile::new("notes.txt", "text/plain", b"hello".to_vec()),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, MergerError::UnsupportedFormat { .. }));
    assert_eq!(session.ids(), before);
}

#[tokio::test]
async fn test_corrupt_pdf_fails_whole_batch() {
    let session = Session::default();
    let err = session
        .ingest(vec![
            png_input("ok.png"),
            InputFile::new("broken.pdf", "application/pdf", b"%PDF-1.4 garbage".to_vec()),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, MergerError::Codec { .. }));
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_jpeg_becomes_single_page() {
    let session = Session::default();
    session
        .ingest(vec![InputFile::new("photo.jpg", "image/jpeg", jpeg(64, 48))])
        .await
        .unwrap();

    let doc = &session.documents()[0];
    assert_eq!(doc.page_count, 1);
    assert!(doc.preview.is_ok());
}

#[tokio::test]
async fn test_merge_empty_collection() {
    let err = Session::default().merge().await.unwrap_err();
    assert!(matches!(err, MergerError::EmptyCollection { .. }));
}
