use deunicode::deunicode;

/// Lowercase, ASCII-only slug. The input is transliterated to ASCII first,
/// `&` reads as `and`, and runs of anything that is not an ASCII alphanumeric
/// collapse into a single `-`, never leading or trailing.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode(&input.replace('&', " and "));

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for ch in ascii.chars() {
        if !ch.is_ascii_alphanumeric() {
            pending_separator = true;
            continue;
        }

        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        slug.push(ch.to_ascii_lowercase());
    }

    slug
}
