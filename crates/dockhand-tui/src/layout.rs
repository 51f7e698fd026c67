//! Column widths, pagination and escape-aware text measurement

use dockhand_config::COLUMN_COUNT;
use unicode_width::UnicodeWidthChar;

/// Minimum width of each table column
pub const COLUMN_MINIMUMS: [u16; COLUMN_COUNT] = [13, 17, 8, 6, 10, 11, 11, 13, 15];

/// Left and right table borders
pub const BORDER_COLUMNS: u16 = 2;

/// Title, two meter rows, spacer, table header, page line, status, footer
pub const CHROME_ROWS: u16 = 8;

pub const LOGS_PANEL_HEIGHT: u16 = 15;
pub const INFO_PANEL_HEIGHT: u16 = 14;

const ELLIPSIS: char = '…';
const STYLE_RESET: &str = "\x1b[0m";

/// Width available to table cells
pub fn usable_width(width: u16) -> u16 {
    width.saturating_sub(BORDER_COLUMNS)
}

/// Allocate column widths from percentages.
///
/// Each column gets `max(minimum, floor(usable * pct / 100))`. A shortfall is
/// handed out one unit at a time round-robin; an overshoot is taken back the
/// same way from columns still above their minimum. Whenever `usable` covers
/// the minimums, the widths sum to exactly `usable`.
pub fn allocate_columns(usable: u16, percents: &[u16; COLUMN_COUNT]) -> [u16; COLUMN_COUNT] {
    let usable_total = u32::from(usable);
    let mut widths = [0u16; COLUMN_COUNT];
    for (i, width) in widths.iter_mut().enumerate() {
        let share = (usable_total * u32::from(percents[i]) / 100) as u16;
        *width = share.max(COLUMN_MINIMUMS[i]);
    }

    let mut total: u32 = widths.iter().map(|w| u32::from(*w)).sum();
    let mut i = 0;
    while total < usable_total {
        widths[i % COLUMN_COUNT] += 1;
        total += 1;
        i += 1;
    }

    let mut i = 0;
    let mut stalled = 0;
    while total > usable_total && stalled < COLUMN_COUNT {
        let col = i % COLUMN_COUNT;
        if widths[col] > COLUMN_MINIMUMS[col] {
            widths[col] -= 1;
            total -= 1;
            stalled = 0;
        } else {
            stalled += 1;
        }
        i += 1;
    }

    widths
}

/// Rows available to the table body
pub fn page_size(height: u16, panel_height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS + panel_height)).max(1)
}

/// Number of pages needed for `rows` (at least one)
pub fn page_count(rows: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    rows.div_ceil(size).max(1)
}

/// Page holding the cursor
pub fn page_of(cursor: usize, page_size: usize) -> usize {
    cursor / page_size.max(1)
}

/// Keep a cursor inside `0..rows`
pub fn clamp_cursor(cursor: usize, rows: usize) -> usize {
    if rows == 0 {
        0
    } else {
        cursor.min(rows - 1)
    }
}

/// Length of the escape sequence starting at `chars[0]`, if it is one
fn escape_len(chars: &[char]) -> Option<usize> {
    if chars.first() != Some(&'\x1b') {
        return None;
    }
    if chars.get(1) != Some(&'[') {
        return Some(1);
    }
    let end = chars[2..]
        .iter()
        .position(|c| ('@'..='~').contains(c))
        .map(|p| p + 3)
        .unwrap_or(chars.len());
    Some(end)
}

/// Display width of `text`, ignoring ANSI escape sequences
pub fn visible_width(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut width = 0;
    let mut i = 0;
    while i < chars.len() {
        if let Some(len) = escape_len(&chars[i..]) {
            i += len;
            continue;
        }
        width += chars[i].width().unwrap_or(0);
        i += 1;
    }
    width
}

/// Cut `text` to `max` display columns, ending in an ellipsis when shortened.
///
/// Escape sequences are kept and do not count towards the width. A trailing
/// style reset in the input is carried over to the output.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if visible_width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let budget = max - 1;
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut width = 0;
    let mut i = 0;
    while i < chars.len() {
        if let Some(len) = escape_len(&chars[i..]) {
            let end = (i + len).min(chars.len());
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }
        let w = chars[i].width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        out.push(chars[i]);
        width += w;
        i += 1;
    }

    out.push(ELLIPSIS);
    if text.ends_with(STYLE_RESET) {
        out.push_str(STYLE_RESET);
    }
    out
}

/// Truncate, then right-pad with spaces to exactly `width` columns
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut out = truncate_to_width(text, width);
    let used = visible_width(&out);
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhand_config::DEFAULT_COLUMN_PERCENTS;
    use proptest::prelude::*;

    fn min_total() -> u16 {
        COLUMN_MINIMUMS.iter().sum()
    }

    // ==================== allocate_columns tests ====================

    #[test]
    fn test_allocation_fills_wide_terminal() {
        let widths = allocate_columns(198, &DEFAULT_COLUMN_PERCENTS);
        assert_eq!(widths.iter().sum::<u16>(), 198);
        for (w, min) in widths.iter().zip(COLUMN_MINIMUMS) {
            assert!(*w >= min);
        }
    }

    #[test]
    fn test_allocation_at_minimum_width() {
        let widths = allocate_columns(min_total(), &DEFAULT_COLUMN_PERCENTS);
        assert_eq!(widths, COLUMN_MINIMUMS);
    }

    #[test]
    fn test_allocation_narrow_terminal_stays_at_minimums() {
        let widths = allocate_columns(40, &DEFAULT_COLUMN_PERCENTS);
        assert_eq!(widths, COLUMN_MINIMUMS);
    }

    #[test]
    fn test_allocation_overshoot_shrinks_round_robin() {
        // 15,17,15,15,15,15,15,15,30 overshoots by two; NAME sits at its minimum
        let percents = [10, 10, 10, 10, 10, 10, 10, 10, 20];
        let widths = allocate_columns(150, &percents);
        assert_eq!(widths, [14, 17, 14, 15, 15, 15, 15, 15, 30]);
    }

    #[test]
    fn test_allocation_shortfall_grows_round_robin() {
        let percents = [10, 10, 10, 10, 10, 10, 10, 10, 10];
        let widths = allocate_columns(200, &percents);
        // 20 each leaves 20 over: two full rounds, then columns 0 and 1
        assert_eq!(widths.iter().sum::<u16>(), 200);
        assert_eq!(widths[0], 23);
        assert_eq!(widths[8], 22);
    }

    // ==================== pagination tests ====================

    #[test]
    fn test_page_size_subtracts_chrome_and_panel() {
        assert_eq!(page_size(40, 0), 32);
        assert_eq!(page_size(40, LOGS_PANEL_HEIGHT), 17);
        assert_eq!(page_size(10, INFO_PANEL_HEIGHT), 1);
        assert_eq!(page_size(0, 0), 1);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }

    #[test]
    fn test_clamp_cursor() {
        assert_eq!(clamp_cursor(5, 0), 0);
        assert_eq!(clamp_cursor(5, 3), 2);
        assert_eq!(clamp_cursor(1, 3), 1);
    }

    // ==================== text width tests ====================

    #[test]
    fn test_visible_width_ignores_escapes() {
        assert_eq!(visible_width("\x1b[31mred\x1b[0m"), 3);
        assert_eq!(visible_width("plain"), 5);
        assert_eq!(visible_width("日本"), 4);
    }

    #[test]
    fn test_truncate_plain() {
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_truncate_keeps_trailing_reset() {
        let out = truncate_to_width("\x1b[32mhello world\x1b[0m", 6);
        assert_eq!(out, "\x1b[32mhello…\x1b[0m");
        assert_eq!(visible_width(&out), 6);
    }

    #[test]
    fn test_fit_pads() {
        assert_eq!(fit_to_width("ab", 4), "ab  ");
        assert_eq!(fit_to_width("abcdef", 4), "abc…");
    }

    proptest! {
        #[test]
        fn prop_allocation_exact_and_above_minimums(
            usable in 104u16..600,
            percents in proptest::array::uniform9(0u16..=100),
        ) {
            let widths = allocate_columns(usable, &percents);
            prop_assert_eq!(widths.iter().map(|w| u32::from(*w)).sum::<u32>(), u32::from(usable));
            for (w, min) in widths.iter().zip(COLUMN_MINIMUMS) {
                prop_assert!(*w >= min);
            }
        }

        #[test]
        fn prop_cursor_lies_on_its_page(cursor in 0usize..10_000, size in 1usize..200) {
            let page = page_of(cursor, size);
            prop_assert!(page * size <= cursor);
            prop_assert!(cursor < page * size + size);
        }

        #[test]
        fn prop_truncate_respects_width(text in "[a-z \u{1b}\\[0-9m]{0,40}", max in 0usize..30) {
            prop_assert!(visible_width(&truncate_to_width(&text, max)) <= max);
        }
    }
}
