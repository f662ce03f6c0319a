use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Fit `s` into `max_cells` terminal cells, ending in `…` when cut.
/// Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if width + w > budget {
            break;
        }
        width += w;
        out.push_str(grapheme);
    }
    out.push('\u{2026}');
    out
}

/// Remove the last grapheme cluster (backspace in a text prompt).
pub fn pop_grapheme(s: &mut String) {
    if let Some((start, _)) = s.grapheme_indices(true).next_back() {
        s.truncate(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_cells() {
        assert_eq!(display_width("Pousadas"), 8);
        assert_eq!(display_width("Cafés"), 5);
        assert_eq!(display_width("日本"), 4);
    }

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate_to_width("Lojas", 10), "Lojas");
        assert_eq!(truncate_to_width("Lojas", 5), "Lojas");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Restaurantes", 6), "Resta…");
        assert_eq!(truncate_to_width("Restaurantes", 1), "…");
        assert_eq!(truncate_to_width("Restaurantes", 0), "");
    }

    #[test]
    fn truncate_keeps_wide_chars_whole() {
        // each char is 2 cells; budget 4 fits two
        assert_eq!(truncate_to_width("日本語です", 5), "日本…");
    }

    #[test]
    fn pop_removes_whole_cluster() {
        let mut s = String::from("Cafe\u{301}");
        pop_grapheme(&mut s);
        assert_eq!(s, "Caf");
        let mut empty = String::new();
        pop_grapheme(&mut empty);
        assert_eq!(empty, "");
    }
}
