//! Splitting a PDF into pages, editing, and saving it again.

use pdfmerger::Session;
use pdfmerger::config::Edit;
use pdfmerger::error::MergerError;
use pdfmerger::model::Mode;

use crate::common::{markers, pdf_input, png_input};

async fn extractor(pages: usize) -> Session {
    let session = Session::default();
    session.set_mode(Mode::Extractor).unwrap();
    let added = session.extract(pdf_input("five.pdf", pages)).await.unwrap();
    assert_eq!(added, pages);
    session
}

#[tokio::test]
async fn test_move_and_remove_then_save() {
    let session = extractor(5).await;
    let ids = session.ids();

    session.reorder(&ids[4], &ids[0]).unwrap();
    session.remove(&ids[2]).unwrap();

    let output = session.save_extracted().await.unwrap();
    assert_eq!(output.filename, "extracted-five.pdf");
    assert_eq!(output.page_count, 4);
    assert_eq!(
        markers(&output.bytes),
        vec!["five 5", "five 1", "five 2", "five 4"]
    );
}

#[tokio::test]
async fn test_label_edits_match_direct_edits() {
    let session = extractor(5).await;
    session
        .apply_edits(&[Edit::Move { source: 5, target: 1 }, Edit::Remove(3)])
        .unwrap();

    let numbers: Vec<usize> = session.pages().iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![5, 1, 2, 4]);
}

#[tokio::test]
async fn test_round_trip_keeps_pages_in_order() {
    let session = extractor(6).await;
    let output = session.assemble().await.unwrap();

    let expected: Vec<String> = (1..=6).map(|n| format!("five {n}")).collect();
    assert_eq!(markers(&output.bytes), expected);
}

#[tokio::test]
async fn test_each_page_is_a_standalone_pdf() {
    let session = extractor(3).await;
    for page in session.pages() {
        assert_eq!(
            markers(&page.content),
            vec![format!("five {}", page.page_number)]
        );
        assert!(page.preview.is_ok());
    }
}

#[tokio::test]
async fn test_extract_replaces_previous_pages() {
    let session = extractor(5).await;
    session.extract(pdf_input("two.pdf", 2)).await.unwrap();

    assert_eq!(session.len(), 2);
    assert_eq!(session.source_name().as_deref(), Some("two.pdf"));
}

#[tokio::test]
async fn test_extractor_rejects_images() {
    let session = Session::default();
    session.set_mode(Mode::Extractor).unwrap();
    let err = session.extract(png_input("scan.png")).await.unwrap_err();
    assert!(matches!(err, MergerError::UnsupportedFormat { .. }));
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_mode_switch_clears_collections() {
    let session = extractor(3).await;
    session.set_mode(Mode::Merger).unwrap();
    assert!(session.is_empty());

    session.set_mode(Mode::Extractor).unwrap();
    assert!(session.is_empty());
    assert_eq!(session.source_name(), None);
}

#[tokio::test]
async fn test_save_after_removing_everything() {
    let session = extractor(2).await;
    for id in session.ids() {
        session.remove(&id).unwrap();
    }
    let err = session.save_extracted().await.unwrap_err();
    assert!(matches!(err, MergerError::EmptyCollection { .. }));
}
