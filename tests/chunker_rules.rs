use pdf_chunker::{
    chunker::{Chunk, ChunkRules},
    config::{Chunking, Config},
};

fn rules() -> ChunkRules {
    ChunkRules::from_config(&Config::default().chunking).unwrap()
}

fn lines_of(ch: char, width: usize, count: usize) -> String {
    vec![ch.to_string().repeat(width); count].join("\n")
}

#[test]
fn short_buffer_ignores_boundary() {
    let rules = rules();
    let mut doc = rules.start("book.pdf");
    doc.push_page(1, "intro\nProblem 1\nabc");
    let chunks = doc.finish();

    assert_eq!(
        chunks,
        vec![Chunk {
            source: "book.pdf".into(),
            page: None,
            content: "intro\nProblem 1\nabc".into(),
        }]
    );
}

#[test]
fn boundary_splits_once_buffer_is_long_enough() {
    let rules = rules();
    let mut doc = rules.start("book.pdf");
    let long = "a".repeat(450);
    doc.push_page(1, &format!("{long}\nProblem 2 solve for x\nx = 3"));
    let chunks = doc.finish();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].page, Some(1));
    assert_eq!(chunks[0].content, long);
    assert_eq!(chunks[1].page, None);
    assert_eq!(chunks[1].content, "Problem 2 solve for x\nx = 3");
}

#[test]
fn boundary_at_exactly_min_length_does_not_split() {
    let rules = rules();
    let mut doc = rules.start("book.pdf");
    // 399 chars + newline = 400, which is not more than the minimum.
    doc.push_page(1, &format!("{}\nQuestion 3", "a".repeat(399)));
    let chunks = doc.finish();

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].content.ends_with("Question 3"));
}

#[test]
fn markers_are_case_insensitive_and_include_latex() {
    let rules = rules();
    for line in [
        "exercise 4.2",
        "EXERCISE 10.11 (continued)",
        "question 7",
        "see problem 12 below",
        r"\[ x^2 \]",
        r"\( a + b \)",
        "costs $5",
    ] {
        assert!(rules.is_boundary(line), "{line:?} should be a boundary");
    }
    for line in ["Exercise 4", "Questions", "plain prose line"] {
        assert!(!rules.is_boundary(line), "{line:?} should not be a boundary");
    }
}

#[test]
fn cap_closes_chunk_with_current_page() {
    let rules = rules();
    let mut doc = rules.start("book.pdf");
    // 13 lines of 99 chars: the 12th reaches exactly 1200, the 13th goes over.
    doc.push_page(4, &lines_of('b', 99, 13));
    let chunks = doc.abandon();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].page, Some(4));
    assert_eq!(chunks[0].content.lines().count(), 13);
}

#[test]
fn no_chunk_exceeds_cap_plus_one_line() {
    let cfg = Config::default().chunking;
    let rules = ChunkRules::from_config(&cfg).unwrap();
    let mut doc = rules.start("book.pdf");

    let mut longest_line = 0;
    for page in 1..=5u32 {
        let mut text = Vec::new();
        for i in 0..40usize {
            let width = 10 + (i * 37 + page as usize * 11) % 180;
            longest_line = longest_line.max(width);
            if i % 9 == 0 {
                text.push(format!("Exercise {page}.{i} {}", "c".repeat(width)));
                longest_line = longest_line.max(width + 16);
            } else {
                text.push("c".repeat(width));
            }
        }
        doc.push_page(page, &text.join("\n"));
    }
    let chunks = doc.finish();

    assert!(chunks.len() > 5);
    for c in &chunks {
        assert!(
            c.content.chars().count() <= cfg.max_chars + longest_line + 1,
            "chunk of {} chars",
            c.content.chars().count()
        );
    }
}

#[test]
fn buffer_carries_across_pages() {
    let rules = rules();
    let mut doc = rules.start("book.pdf");
    doc.push_page(1, &"a".repeat(450));
    doc.push_page(2, "Problem 9\nmore");
    let chunks = doc.finish();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].page, Some(2));
    assert_eq!(chunks[0].content, "a".repeat(450));
    assert_eq!(chunks[1].content, "Problem 9\nmore");
}

#[test]
fn whitespace_only_trailing_chunk_is_dropped_by_default() {
    let rules = rules();
    let mut doc = rules.start("book.pdf");
    doc.push_page(1, &format!("{}\n", "a".repeat(1250)));
    let chunks = doc.finish();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].page, Some(1));
}

#[test]
fn keep_empty_chunks_restores_empty_trailing_flush() {
    let cfg = Chunking {
        keep_empty_chunks: true,
        ..Chunking::default()
    };
    let rules = ChunkRules::from_config(&cfg).unwrap();
    let mut doc = rules.start("book.pdf");
    doc.push_page(1, &format!("{}\n", "a".repeat(1250)));
    let chunks = doc.finish();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].page, None);
    assert_eq!(chunks[1].content, "");
}

#[test]
fn lengths_count_characters_not_bytes() {
    let rules = rules();

    // 350 two-byte chars: 700 bytes but only 351 characters with the newline.
    let mut doc = rules.start("book.pdf");
    doc.push_page(1, &format!("{}\nProblem 1", "é".repeat(350)));
    assert_eq!(doc.finish().len(), 1);

    let mut doc = rules.start("book.pdf");
    doc.push_page(1, &format!("{}\nProblem 1", "é".repeat(450)));
    assert_eq!(doc.finish().len(), 2);
}

#[test]
fn abandon_drops_in_progress_buffer() {
    let rules = rules();
    let mut doc = rules.start("book.pdf");
    doc.push_page(1, &format!("{}\nleftover", lines_of('b', 99, 13)));
    assert_eq!(doc.emitted().len(), 1);

    let chunks = doc.abandon();
    assert_eq!(chunks.len(), 1);
    assert!(!chunks[0].content.contains("leftover"));
}

#[test]
fn rejects_bad_rules() {
    let bad_pattern = Chunking {
        boundary_pattern: "(unclosed".into(),
        ..Chunking::default()
    };
    assert!(ChunkRules::from_config(&bad_pattern).is_err());

    let zero_cap = Chunking {
        max_chars: 0,
        ..Chunking::default()
    };
    assert!(ChunkRules::from_config(&zero_cap).is_err());
}

#[test]
fn chunk_json_shape() {
    let with_page = Chunk {
        source: "a.pdf".into(),
        page: Some(3),
        content: "x \"y\"".into(),
    };
    assert_eq!(
        serde_json::to_string(&with_page).unwrap(),
        r#"{"source":"a.pdf","page":3,"content":"x \"y\""}"#
    );

    let trailing = Chunk {
        source: "a.pdf".into(),
        page: None,
        content: "tail".into(),
    };
    assert_eq!(
        serde_json::to_string(&trailing).unwrap(),
        r#"{"source":"a.pdf","content":"tail"}"#
    );
}
