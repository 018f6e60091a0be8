use serde::Serialize;

pub mod admin;
pub mod audit;
pub mod blog;
pub mod category;
pub mod contact;
pub mod inquiry;
pub mod review;
pub mod settings;
pub mod tag;

/// One page of an ordered, filtered listing.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Page {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Escape `%`, `_` and the escape char itself for use in `LIKE ... ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
