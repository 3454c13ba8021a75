use crate::config::Config;
use unicode_normalization::UnicodeNormalization;

/// Cleans one page of extracted or recognized text before it is chunked.
pub fn normalize_page(cfg: &Config, raw: &str) -> String {
    let mut text = raw.to_string();

    if cfg.text.normalize_newlines {
        text = text.replace("\r\n", "\n").replace('\r', "\n");
    }

    if cfg.text.strip_form_feeds {
        text = text.replace('\u{c}', "");
    }

    if cfg.text.normalize_unicode {
        text = text.nfkc().collect::<String>();
    }

    sanitize_control_chars(&text, &cfg.text.control_chars_to_sanitize)
}

fn sanitize_control_chars(s: &str, codes: &[u8]) -> String {
    if codes.is_empty() {
        return s.to_string();
    }

    let mut mask = [false; 128];
    for &code in codes {
        if (code as usize) < mask.len() {
            mask[code as usize] = true;
        }
    }

    s.chars()
        .filter(|&ch| {
            // Line structure drives chunking; never drop these.
            if ch == '\n' || ch == '\t' {
                return true;
            }
            let cp = ch as u32;
            if cp < 128 { !mask[cp as usize] } else { true }
        })
        .collect()
}
