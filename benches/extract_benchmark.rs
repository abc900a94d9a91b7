use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vw1871_rs::notification::normalize_hex;
use vw1871_rs::Extractor;

const COMPACT: &str = "25442D2C703749741F168D208E320502213A4A3B74FA49CEF847D54C4FB74C4175ED60D3E8D9";
const FULL: &str = "30442D2C703749741F168D20B4231B022145A1C3E7095B2D6F8811A93C4D5E6F708192A3B4C5D6E7F8091A2B3C4D5E6F70";
const META: &str = "1101250808EC916261A501";

fn packed_notification() -> String {
    let envelope = |t: &str| format!("FBFBFBF0{META}{t}FEFE0E0F");
    format!(
        "{}{}{}FBFBFBF0{META}{}",
        envelope(COMPACT),
        envelope(COMPACT),
        envelope(FULL),
        &FULL[..94]
    )
}

fn benchmark_extract(c: &mut Criterion) {
    let extractor = Extractor::default();

    let single = normalize_hex(&format!("FBFBFBF011012508E2DF916261B101{COMPACT}1A2BFEFE0E0F"))
        .unwrap()
        .into_bytes();
    c.bench_function("extract_size_class_59", |b| {
        b.iter(|| {
            let result = extractor.extract(black_box(&single));
            let _ = black_box(result);
        })
    });

    let packed = normalize_hex(&packed_notification()).unwrap().into_bytes();
    c.bench_function("extract_packed_244", |b| {
        b.iter(|| {
            let result = extractor.extract(black_box(&packed));
            let _ = black_box(result);
        })
    });

    let noise: Vec<u8> = (0..200u32).map(|i| (i * 37 % 251) as u8).collect();
    c.bench_function("extract_unframed_noise", |b| {
        b.iter(|| {
            let result = extractor.extract(black_box(&noise));
            let _ = black_box(result);
        })
    });
}

fn benchmark_normalize(c: &mut Criterion) {
    let text = packed_notification();
    c.bench_function("normalize_hex_244", |b| {
        b.iter(|| {
            let result = normalize_hex(black_box(&text));
            let _ = black_box(result);
        })
    });
}

criterion_group!(benches, benchmark_extract, benchmark_normalize);
criterion_main!(benches);
