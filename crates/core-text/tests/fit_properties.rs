use core_text::{DisplayLine, display_width};
use proptest::prelude::*;

fn rows_for(text: &str, width: usize, marker: usize) -> Vec<DisplayLine> {
    let mut rows = vec![DisplayLine::fit(0, text, 0, width, marker)];
    while let Some(next) = rows.last().and_then(|r| r.continuation(text, width, marker)) {
        rows.push(next);
    }
    rows
}

proptest! {
    // Wrapping a line row by row reproduces it exactly, and every row that carries a
    // marker leaves room for it.
    #[test]
    fn wrapped_rows_cover_line(text in "[a-z 漢é]{0,60}", width in 3usize..20) {
        let rows = rows_for(&text, width, 1);
        let joined: String = rows.iter().map(|r| r.slice(&text)).collect();
        prop_assert_eq!(&joined, &text);
        for row in &rows {
            let w = display_width(row.slice(&text));
            if row.more_after() {
                prop_assert!(w < width, "row width {} leaves no marker room in {}", w, width);
            } else {
                prop_assert!(w <= width);
            }
        }
    }
}
