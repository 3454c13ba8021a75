use pdf_chunker::{config::Config, postprocess::normalize_page};

#[test]
fn normalizes_newlines_and_form_feeds() {
    let cfg = Config::default();
    let out = normalize_page(&cfg, "one\r\ntwo\rthree\n\u{c}");
    assert_eq!(out, "one\ntwo\nthree\n");
}

#[test]
fn sanitizes_control_chars() {
    let cfg = Config::default();
    let out = normalize_page(&cfg, "Alpha\u{0002}Beta\u{001b}\nLine\tTabbed");

    assert_eq!(out, "AlphaBeta\nLine\tTabbed");
}

#[test]
fn unicode_normalization_is_opt_in() {
    let mut cfg = Config::default();
    assert_eq!(normalize_page(&cfg, "ﬁnd x²"), "ﬁnd x²");

    cfg.text.normalize_unicode = true;
    assert_eq!(normalize_page(&cfg, "ﬁnd x²"), "find x2");
}
