#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfmerger::Session;
use pdfmerger::model::{InputFile, Mode, PDF_MEDIA_TYPE};
use std::sync::OnceLock;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Builder::new_current_thread().enable_all().build().unwrap())
}

// The first byte picks the declared media type; the rest is the payload.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let media_type = match selector % 3 {
        0 => PDF_MEDIA_TYPE,
        1 => "image/png",
        _ => "image/jpeg",
    };

    runtime().block_on(async {
        let session = Session::default();
        let input = InputFile::new("fuzz", media_type, payload.to_vec());

        match session.ingest(vec![input.clone()]).await {
            Ok(added) => {
                assert_eq!(added, 1);
                let output = session.merge().await;
                if let Ok(output) = output {
                    assert_eq!(output.page_count, session.documents()[0].page_count);
                }
            }
            Err(_) => assert!(session.is_empty()),
        }

        if media_type == PDF_MEDIA_TYPE {
            session.set_mode(Mode::Extractor).unwrap();
            if let Ok(pages) = session.extract(input).await {
                assert_eq!(pages, session.len());
            }
        }
        assert!(!session.is_busy());
    });
});
