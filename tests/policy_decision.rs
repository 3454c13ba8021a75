use pdf_chunker::{
    config::Config,
    policy::{decide, is_page_empty, OcrMode, Reason, TextSource},
};

#[test]
fn near_empty_page_detection() {
    assert!(is_page_empty("", 10));
    assert!(is_page_empty("  \n\t 12345 \n ", 10));
    assert!(is_page_empty("123456789", 10));
    assert!(!is_page_empty("0123456789", 10));
}

#[test]
fn auto_ocrs_only_empty_pages() {
    let d = decide(OcrMode::Auto, 10, "   \n");
    assert_eq!(d.source, TextSource::Ocr);
    assert_eq!(d.reason, Reason::LowText);

    let d = decide(OcrMode::Auto, 10, "Chapter 1: Real Numbers");
    assert_eq!(d.source, TextSource::Native);
    assert_eq!(d.reason, Reason::NativeText);
}

#[test]
fn off_and_force_modes() {
    let d = decide(OcrMode::Off, 10, "");
    assert_eq!(d.source, TextSource::Native);
    assert_eq!(d.reason, Reason::OcrDisabled);

    let d = decide(OcrMode::Force, 10, "plenty of embedded text here");
    assert_eq!(d.source, TextSource::Ocr);
    assert_eq!(d.reason, Reason::Forced);
}

#[test]
fn mode_from_config() {
    let mut cfg = Config::default();
    assert_eq!(OcrMode::from_config(&cfg).unwrap(), OcrMode::Auto);

    cfg.ocr.mode = "FORCE".into();
    assert_eq!(OcrMode::from_config(&cfg).unwrap(), OcrMode::Force);

    cfg.ocr.mode = "sometimes".into();
    assert!(OcrMode::from_config(&cfg).is_err());
}

#[test]
fn auto_decision_agrees_with_empty_check() {
    for text in ["", " \n\u{c}", "123456789", "0123456789", "  short  ", "Chapter 1: Real Numbers"] {
        let d = decide(OcrMode::Auto, 10, text);
        assert_eq!(
            d.source == TextSource::Ocr,
            is_page_empty(text, 10),
            "{text:?}"
        );
        assert_eq!(d.native_chars, text.trim().chars().count());
    }
}
