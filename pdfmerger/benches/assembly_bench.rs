//! Performance benchmarks for pdfmerger.
//!
//! Run with: cargo bench
//!
//! Inputs are generated in memory, so no fixtures are needed.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use pdfmerger::assembly::Assembler;
use pdfmerger::codec::PdfCodec;
use pdfmerger::config::CompressionLevel;
use pdfmerger::ingest::Ingestor;
use pdfmerger::model::{IdGenerator, InputFile, PDF_MEDIA_TYPE};
use pdfmerger::progress::NoProgress;

/// A PDF with `pages` text pages.
fn sample_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for n in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 750.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("benchmark page {n}").into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn inputs(count: usize, pages: usize) -> Vec<InputFile> {
    let bytes = sample_pdf(pages);
    (0..count)
        .map(|i| InputFile::new(format!("doc{i}.pdf"), PDF_MEDIA_TYPE, bytes.clone()))
        .collect()
}

/// Benchmark: Ingest a batch of PDFs
fn bench_ingest(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ingestor = Ingestor::default();

    let mut group = c.benchmark_group("ingest");
    for count in [1, 4, 16] {
        let batch = inputs(count, 5);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{count}_files")),
            &batch,
            |b, batch| {
                b.to_async(&rt).iter(|| async {
                    let docs = ingestor
                        .ingest(black_box(batch.clone()), &IdGenerator::new(), &NoProgress)
                        .await
                        .unwrap();
                    assert_eq!(docs.len(), batch.len());
                });
            },
        );
    }
    group.finish();
}

/// Benchmark: Merge scaling with number of documents
fn bench_merge_scaling(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let assembler = Assembler::default();

    let mut group = c.benchmark_group("merge_scaling");
    for count in [2, 5, 10, 20] {
        let docs = rt
            .block_on(Ingestor::default().ingest(
                inputs(count, 3),
                &IdGenerator::new(),
                &NoProgress,
            ))
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{count}_files")),
            &docs,
            |b, docs| {
                b.to_async(&rt).iter(|| async {
                    let output = assembler.merge(black_box(docs), &NoProgress).await.unwrap();
                    assert_eq!(output.page_count, docs.len() * 3);
                });
            },
        );
    }
    group.finish();
}

/// Benchmark: Merge with different compression levels
fn bench_merge_compression(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let docs = rt
        .block_on(Ingestor::default().ingest(inputs(4, 10), &IdGenerator::new(), &NoProgress))
        .unwrap();

    let mut group = c.benchmark_group("merge_compression");
    for level in [
        CompressionLevel::None,
        CompressionLevel::Standard,
        CompressionLevel::Maximum,
    ] {
        let assembler = Assembler::new(PdfCodec::with_compression(level));
        group.bench_function(BenchmarkId::from_parameter(format!("{level:?}")), |b| {
            b.to_async(&rt).iter(|| async {
                assembler.merge(black_box(&docs), &NoProgress).await.unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark: Split a PDF into pages
fn bench_extract(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let assembler = Assembler::default();
    let input = InputFile::new("long.pdf", PDF_MEDIA_TYPE, sample_pdf(50));

    c.bench_function("extract_50_pages", |b| {
        b.to_async(&rt).iter(|| async {
            let pages = assembler
                .extract(black_box(&input), &IdGenerator::new(), &NoProgress)
                .await
                .unwrap();
            assert_eq!(pages.len(), 50);
        });
    });
}

criterion_group!(
    benches,
    bench_ingest,
    bench_merge_scaling,
    bench_merge_compression,
    bench_extract,
);

criterion_main!(benches);
