use vw1871_rs::frame::{Anomalies, Strategy, TelegramClass, TelegramFlags};
use vw1871_rs::util::hex::decode_hex;
use vw1871_rs::{extract_hex, ExtractError, Extractor, TelegramKind};

const START: &str = "FBFBFBF0";
const END: &str = "FEFE0E0F";

// FlowIQ2101 (KAM, id 74493770) telegrams as relayed by the concentrator
const COMPACT: &str = "25442D2C703749741F168D208E320502213A4A3B74FA49CEF847D54C4FB74C4175ED60D3E8D9";
const FULL: &str = "30442D2C703749741F168D20B4231B022145A1C3E7095B2D6F8811A93C4D5E6F708192A3B4C5D6E7F8091A2B3C4D5E6F70";

// Envelope metadata seen in front of telegrams
const META: &str = "1101250808EC916261A501";
const HEADER_15: &str = "FBFBFBF011012508E2DF916261B101";
const TRAILER_6: &str = "1A2BFEFE0E0F";

fn envelope(telegram: &str) -> String {
    format!("{START}{META}{telegram}{END}")
}

fn byte_len(hex: &str) -> usize {
    hex.len() / 2
}

#[test]
fn test_concrete_wrapped_example() {
    let interior = "25442D2C703749741F168D20B4231B0221\
                    7A11C2E94F0385D6B21E44A9F0C37D5518E2B6A09C4D7F3166B0E2D8";
    let telegrams = extract_hex(&format!("{START}{interior}{END}")).unwrap();
    assert_eq!(telegrams, vec![interior.to_string()]);
}

#[test]
fn test_wrapped_payload_with_inner_end_marker() {
    let payload = "00112233445566778899FEFE0E0FAABBCCDDEEFF0102030405060708";
    let extraction = Extractor::default()
        .extract_hex(&format!("{START}{payload}{END}"))
        .unwrap();

    assert_eq!(extraction.report.strategy, Strategy::WrapperStrip);
    assert_eq!(extraction.hex_strings(), vec![payload]);
    assert_eq!(extraction.report.dropped, 0);
    assert_eq!(extraction.report.unframed, 0);
}

#[test]
fn test_wrapped_payload_with_trailing_prefix() {
    let payload = format!("{COMPACT}00112233445566778899{}", "30442D2C0B0C");
    let telegrams = extract_hex(&format!("{START}{payload}{END}")).unwrap();
    assert_eq!(telegrams, vec![payload]);
}

#[test]
fn test_concrete_back_to_back_compact() {
    let extraction = Extractor::default()
        .extract_hex(&format!("{COMPACT}{COMPACT}"))
        .unwrap();

    assert_eq!(extraction.len(), 2);
    for telegram in &extraction.telegrams {
        assert_eq!(telegram.len(), 38);
        assert_eq!(telegram.class(), TelegramClass::Compact);
        assert_eq!(telegram.to_hex(), COMPACT);
    }
    assert_eq!(extraction.telegrams[0].offset(), 0);
    assert_eq!(extraction.telegrams[1].offset(), 38);
}

#[test]
fn test_size_class_compact_59() {
    let hex = format!("{HEADER_15}{COMPACT}{TRAILER_6}");
    assert_eq!(byte_len(&hex), 59);

    let extraction = Extractor::default().extract_hex(&hex).unwrap();
    assert_eq!(extraction.report.strategy, Strategy::SizeClassStrip);
    assert_eq!(extraction.report.size_class, Some(59));
    assert_eq!(extraction.hex_strings(), vec![COMPACT]);
}

#[test]
fn test_size_class_full_70() {
    let hex = format!("{HEADER_15}{FULL}{TRAILER_6}");
    assert_eq!(byte_len(&hex), 70);

    let extraction = Extractor::default().extract_hex(&hex).unwrap();
    assert_eq!(extraction.report.strategy, Strategy::SizeClassStrip);
    assert_eq!(extraction.telegrams[0].kind(), Some(TelegramKind::Full));
    assert_eq!(extraction.hex_strings(), vec![FULL]);
}

#[test]
fn test_packed_244_notification() {
    let partial = &FULL[..94];
    let hex = format!(
        "{}{}{}{START}{META}{partial}",
        envelope(COMPACT),
        envelope(COMPACT),
        envelope(FULL)
    );
    assert_eq!(byte_len(&hex), 244);

    let extraction = Extractor::default().extract_hex(&hex).unwrap();
    assert_eq!(extraction.report.size_class, Some(244));
    assert_eq!(extraction.report.strategy, Strategy::MultiScan);
    assert_eq!(extraction.hex_strings(), vec![COMPACT, COMPACT, FULL, partial]);

    let classes: Vec<_> = extraction.telegrams.iter().map(|t| t.class()).collect();
    assert_eq!(
        classes,
        vec![
            TelegramClass::Compact,
            TelegramClass::Compact,
            TelegramClass::Full,
            TelegramClass::Truncated
        ]
    );
    assert!(extraction.report.anomalies.contains(Anomalies::TRUNCATED));
}

#[test]
fn test_mixed_envelopes_with_filler() {
    let hex = format!("{}0000{}AA{}", envelope(FULL), envelope(COMPACT), envelope(FULL));
    let extraction = Extractor::default().extract_hex(&hex).unwrap();
    assert_eq!(extraction.hex_strings(), vec![FULL, COMPACT, FULL]);

    let offsets: Vec<_> = extraction.telegrams.iter().map(|t| t.offset()).collect();
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_filler_matching_intermediate_size_keeps_both() {
    // 96 bytes by coincidence; the second telegram sits where the class expects one
    let hex = format!("{START}{COMPACT}{END}00000000{START}{COMPACT}{END}");
    assert_eq!(byte_len(&hex), 96);

    let extraction = Extractor::default().extract_hex(&hex).unwrap();
    assert_eq!(extraction.hex_strings(), vec![COMPACT, COMPACT]);
}

#[test]
fn test_truncation_tolerance() {
    let extractor = Extractor::default();

    let partial = &COMPACT[..40];
    let extraction = extractor.extract_hex(&format!("{START}{partial}")).unwrap();
    assert_eq!(extraction.hex_strings(), vec![partial]);
    assert!(extraction.telegrams[0].is_truncated());

    let tiny = &COMPACT[..16];
    let extraction = extractor.extract_hex(&format!("{START}{tiny}")).unwrap();
    assert!(extraction.is_empty());
    assert!(extraction.report.anomalies.contains(Anomalies::SHORT_DROPPED));
}

#[test]
fn test_cut_by_next_envelope() {
    // Hardware cut the first telegram and started a new envelope
    let cut = &COMPACT[..50];
    let hex = format!("{START}{cut}{END}{START}{COMPACT}{END}");
    let extraction = Extractor::default().extract_hex(&hex).unwrap();

    assert_eq!(extraction.hex_strings(), vec![cut, COMPACT]);
    assert!(extraction.telegrams[0].flags().contains(TelegramFlags::TRUNCATED));
    assert!(!extraction.telegrams[1].is_truncated());
}

#[test]
fn test_no_data_fabrication() {
    let extractor = Extractor::default();
    assert!(extractor.extract(&[]).unwrap().is_empty());
    assert!(extractor.extract_hex(END).unwrap().is_empty());
    assert!(extractor.extract_hex(&format!("{END}{END}")).unwrap().is_empty());
}

#[test]
fn test_generic_strip_keeps_unprefixed_payload() {
    let payload = "00112233445566778899AABBCCDD";
    let extraction = Extractor::default()
        .extract_hex(&format!("{START}0A0B0C{END}{START}{payload}{END}"))
        .unwrap();

    // First envelope is below the minimum length
    assert_eq!(extraction.report.strategy, Strategy::GenericStrip);
    assert_eq!(extraction.hex_strings(), vec![payload]);
    assert_eq!(extraction.telegrams[0].class(), TelegramClass::Unrecognized);
    assert_eq!(extraction.report.dropped, 1);
}

#[test]
fn test_unrecognized_size_flagged() {
    let extraction = Extractor::default().extract_hex(COMPACT).unwrap();
    assert!(extraction.report.is_unrecognized_size());
    assert_eq!(extraction.report.strategy, Strategy::FallbackScan);
    assert_eq!(extraction.len(), 1);
}

#[test]
fn test_purity_same_buffer_twice() {
    let extractor = Extractor::default();
    let hex = format!("{HEADER_15}{COMPACT}{TRAILER_6}");
    let first = extractor.extract_hex(&hex).unwrap();
    let second = extractor.extract_hex(&hex).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_input_rejected() {
    assert!(matches!(
        extract_hex("FBFBFBF0 25442D2G"),
        Err(ExtractError::MalformedInput(_))
    ));
    assert!(matches!(
        extract_hex("FBFBFBF0 25442D2"),
        Err(ExtractError::MalformedInput(_))
    ));
}

#[test]
fn test_telegram_header_peek() {
    let extraction = Extractor::default()
        .extract_hex(&format!("{START}{COMPACT}{END}"))
        .unwrap();
    let header = extraction.telegrams[0].header().unwrap();

    assert_eq!(header.length, 0x25);
    assert_eq!(header.declared_len(), 38);
    assert_eq!(header.manufacturer_code(), "KAM");
    assert_eq!(header.device_id(), "74493770");
}

#[test]
fn test_device_address_optional() {
    let mut config = vw1871_rs::ExtractorConfig::default();
    config.device_address = None;
    let extractor = Extractor::new(config).unwrap();

    let other = COMPACT.replace("703749741F16", "112233441F16");
    let extraction = extractor.extract_hex(&format!("{START}{other}{END}")).unwrap();
    assert!(extraction.telegrams[0].flags().is_empty());
    assert_eq!(decode_hex(&extraction.hex_strings()[0]).unwrap().len(), 38);
}
