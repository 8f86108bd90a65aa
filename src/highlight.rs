//! Which caption token is being spoken at a given moment.

use crate::schema::Page;

/// Index of the token being spoken `elapsed_ms` after the page appeared.
///
/// Token windows are half-open `[from_ms, to_ms)` on the same clock as
/// `page.start_ms`. When windows overlap the earliest listed token wins.
pub fn highlighted_token_index(page: &Page, elapsed_ms: f64) -> Option<usize> {
    let absolute_ms = page.start_ms + elapsed_ms;
    page.tokens
        .iter()
        .position(|token| token.contains(absolute_ms))
}
