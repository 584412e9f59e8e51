//! Filesystem-safe episode filenames.

/// Longest slug kept in a filename.
pub const MAX_SLUG_CHARS: usize = 50;

/// Slug used when a title has no usable characters.
const FALLBACK_SLUG: &str = "episodio";

/// `EP{number:03}-{slug}.mp3`, e.g. `EP007-como-monetizar-ia.mp3`.
pub fn episode_filename(episode_number: i64, title: &str) -> String {
    format!("EP{:03}-{}.mp3", episode_number, slugify(title))
}

/// Lowercase, accent-free, hyphen-separated slug of at most
/// [`MAX_SLUG_CHARS`] characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());

    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if let Some(folded) = fold_accent(ch) {
            slug.push_str(folded);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
    }

    // Slug is pure ASCII here, so byte truncation is char truncation.
    slug.truncate(MAX_SLUG_CHARS);
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// ASCII replacement for common accented Latin letters (lowercase input).
fn fold_accent(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' => "a",
        'é' | 'è' | 'ê' | 'ë' | 'ē' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'ī' => "i",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' => "o",
        'ú' | 'ù' | 'û' | 'ü' | 'ū' => "u",
        'ñ' => "n",
        'ç' => "c",
        'ý' | 'ÿ' => "y",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}
