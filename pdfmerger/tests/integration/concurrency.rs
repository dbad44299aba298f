//! Operation gate and progress reporting across a session.

use std::sync::Arc;

use pdfmerger::codec::PdfCodec;
use pdfmerger::error::MergerError;
use pdfmerger::progress::RecordedProgress;
use pdfmerger::session::Session;

use crate::common::{pdf_input, png_input};

#[tokio::test]
async fn test_second_operation_is_rejected_while_busy() {
    let session = Session::default();
    session
        .ingest(vec![pdf_input("a.pdf", 40), pdf_input("b.pdf", 40)])
        .await
        .unwrap();

    let mut merge = Box::pin(session.merge());
    let first = futures::poll!(merge.as_mut());
    assert!(first.is_pending());
    assert!(session.is_busy());

    let rejected = session.ingest(vec![png_input("late.png")]).await;
    assert!(matches!(rejected, Err(MergerError::Busy)));
    assert!(matches!(session.clear(), Err(MergerError::Busy)));

    assert_eq!(merge.await.unwrap().page_count, 80);
    assert_eq!(session.len(), 2);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_progress_reaches_total_then_resets() {
    let sink = Arc::new(RecordedProgress::default());
    let session = Session::with_progress(PdfCodec::new(), sink.clone());

    session
        .ingest(vec![pdf_input("a.pdf", 1), png_input("b.png")])
        .await
        .unwrap();
    session.merge().await.unwrap();

    let updates = sink.updates();
    let ingest_total = updates.iter().filter(|p| p.total == 4).count();
    let merge_total = updates.iter().filter(|p| p.total == 2).count();
    assert_eq!(ingest_total, 4);
    assert_eq!(merge_total, 2);
    assert!(updates.iter().all(|p| p.completed <= p.total));
    assert_eq!(sink.resets(), 2);
}

#[tokio::test]
async fn test_failed_operation_releases_gate() {
    let session = Session::default();
    assert!(session.merge().await.is_err());
    assert!(!session.is_busy());

    session.ingest(vec![pdf_input("a.pdf", 1)]).await.unwrap();
    assert_eq!(session.len(), 1);
}
