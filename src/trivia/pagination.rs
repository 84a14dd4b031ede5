use crate::constants::QUESTIONS_PER_PAGE;

/// Parse the `page` query value the way the browser client sends it.
/// Missing or non-numeric values fall back to page 1.
pub fn page_number(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse().ok()).unwrap_or(1)
}

/// The `page`-th window of `QUESTIONS_PER_PAGE` items (1-based).
/// Pages before the first or past the end are empty.
pub fn paginate<T>(items: &[T], page: i64) -> &[T] {
    paginate_by(items, page, QUESTIONS_PER_PAGE)
}

pub fn paginate_by<T>(items: &[T], page: i64, per_page: usize) -> &[T] {
    if page < 1 || per_page == 0 {
        return &[];
    }
    let start = match usize::try_from(page - 1)
        .ok()
        .and_then(|p| p.checked_mul(per_page))
    {
        Some(start) if start < items.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}
