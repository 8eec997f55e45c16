//! Title cleaning helpers shared by the catalog and rating pipelines.
//!
//! MovieLens titles arrive as `"Godfather, The (1972)"`; the content
//! catalog carries `"The Godfather"` with the year in its own column.
//! These helpers bring the former into the latter's shape.

/// Build the lookup key for a title: lowercased, trimmed, inner
/// whitespace collapsed to single spaces.
///
/// Example: `"  The   Godfather "` -> `"the godfather"`
pub fn title_key(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a trailing four-digit year off a title.
///
/// Example: `"Toy Story (1995)"` -> `("Toy Story", Some(1995))`
///          `"Movie Title"` -> `("Movie Title", None)`
pub fn split_title_year(title: &str) -> (&str, Option<u16>) {
    let trimmed = title.trim();
    let Some(open) = trimmed.rfind(" (") else {
        return (trimmed, None);
    };
    let Some(inner) = trimmed[open + 2..].strip_suffix(')') else {
        return (trimmed, None);
    };
    if inner.len() != 4 || !inner.chars().all(|c| c.is_ascii_digit()) {
        return (trimmed, None);
    }
    match inner.parse::<u16>() {
        Ok(year) => (trimmed[..open].trim_end(), Some(year)),
        Err(_) => (trimmed, None),
    }
}

/// Move a trailing English article to the front.
///
/// Example: `"Godfather, The"` -> `"The Godfather"`
pub fn reorder_article(title: &str) -> String {
    if let Some((head, tail)) = title.rsplit_once(',') {
        let article = tail.trim_start();
        // at least one whitespace between the comma and the article
        if tail.len() > article.len() && matches!(article, "The" | "A" | "An") {
            return format!("{} {}", article, head);
        }
    }
    title.to_string()
}

/// Full cleaning pass applied to MovieLens titles: split the year, then
/// reorder a trailing article.
pub fn clean_title(raw: &str) -> (String, Option<u16>) {
    let (title, year) = split_title_year(raw);
    (reorder_article(title), year)
}
