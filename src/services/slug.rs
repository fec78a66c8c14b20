use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fixed substitution table for Turkish letters whose ASCII forms differ from
/// what plain diacritic stripping would produce (ı has no combining mark at
/// all). Applied before the generic Unicode path.
const TURKISH_MAP: &[(char, char)] = &[
    ('ı', 'i'),
    ('ğ', 'g'),
    ('ü', 'u'),
    ('ş', 's'),
    ('ö', 'o'),
    ('ç', 'c'),
    ('İ', 'i'),
    ('Ğ', 'g'),
    ('Ü', 'u'),
    ('Ş', 's'),
    ('Ö', 'o'),
    ('Ç', 'c'),
];

fn fold_turkish(c: char) -> char {
    TURKISH_MAP
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

/// Derive a URL slug from free text: lowercase, Turkish substitution table,
/// diacritic stripping (NFD, drop combining marks, NFC), then reduce to
/// hyphen-separated `[a-z0-9]` runs. Whitespace-only input yields an empty
/// string; the unique column constraint is the caller's guard against
/// collisions.
pub fn generate_slug(text: &str) -> String {
    let folded: String = text.to_lowercase().chars().map(fold_turkish).collect();

    let stripped: String = folded
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .nfc()
        .collect();

    let filtered: String = stripped
        .chars()
        .filter(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-'
        })
        .collect();

    // Collapse whitespace runs and trim, then turn the remaining separators
    // into single hyphens.
    let mut slug = String::with_capacity(filtered.len());
    let mut pending_space = false;
    for c in filtered.chars() {
        if c.is_whitespace() {
            pending_space = !slug.is_empty();
            continue;
        }
        if pending_space {
            if !slug.ends_with('-') {
                slug.push('-');
            }
            pending_space = false;
        }
        if c == '-' {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else {
            slug.push(c);
        }
    }

    slug
}

pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > 200 {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
