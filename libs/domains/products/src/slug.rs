//! URL slug generation for products.

/// Lowercases, strips everything that is not alphanumeric or
/// whitespace, and joins the remaining words with hyphens.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Appends `-1`, `-2`, ... to `base` until `taken` no longer matches.
pub fn unique_slug<F>(base: &str, mut taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !taken(base) {
        return base.to_string();
    }

    let mut count = 1;
    loop {
        let candidate = format!("{base}-{count}");
        if !taken(&candidate) {
            return candidate;
        }
        count += 1;
    }
}
