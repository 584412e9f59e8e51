//! Text pipeline for speech synthesis.
//!
//! Scripts are written for reading: markdown headings, bullet lists, links and
//! stage directions such as `[MÚSICA]`. A speech engine would read those
//! markers aloud, so [`clean_script`] reduces a script to plain prose while
//! keeping the punctuation that drives natural pauses.
//!
//! Estimates are linear in the cleaned length. The same numbers are used for
//! cost previews before generation and as the fallback stored duration after.

use std::sync::OnceLock;

use regex::Regex;

/// Average characters per spoken word, trailing space included.
const CHARS_PER_WORD: i64 = 5;

/// Speaking rate used for duration estimates.
const WORDS_PER_MINUTE: i64 = 150;

/// Ordered rewrite rules applied by [`clean_script`].
const CLEANING_RULES: &[(&str, &str)] = &[
    // Code fences and HTML tags
    (r"(?m)^\s*```.*$", ""),
    (r"<[^>\n]+>", ""),
    // Horizontal rules before list markers, since `---` and `***` look like bullets
    (r"(?m)^[ \t]*(?:[-*_][ \t]*){3,}$", ""),
    (r"(?m)^[ \t]{0,3}#{1,6}[ \t]*", ""),
    (r"(?m)^[ \t]*>[ \t]?", ""),
    (r"(?m)^[ \t]*[-*+•][ \t]+", ""),
    (r"(?m)^[ \t]*\d{1,3}[.)][ \t]+", ""),
    // Images vanish, links keep their text
    (r"!\[[^\]]*\]\([^)]*\)", ""),
    (r"\[([^\]]+)\]\([^)]*\)", "${1}"),
    // Stage directions
    (r"\[[^\]\n]*\]", ""),
    (
        r"(?i)\(\s*(?:pausa|pause|música|musica|music|risas|laughs|sfx|efecto de sonido|sonido)\b[^)\n]*\)",
        "",
    ),
    // Emphasis and inline code
    (r"(\*\*|__)([^\n]+?)(\*\*|__)", "${2}"),
    (r"~~([^\n]+?)~~", "${1}"),
    (r"`+", ""),
    (r"\*", ""),
    (r"(^|[\s(])_([^_\n]+)_", "${1}${2}"),
    // Whitespace
    (r"[ \t]+", " "),
    (r"(?m)^ | $", ""),
    (r"\n{3,}", "\n\n"),
];

fn cleaning_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        CLEANING_RULES
            .iter()
            .filter_map(|(pattern, replacement)| match Regex::new(pattern) {
                Ok(re) => Some((re, *replacement)),
                Err(e) => {
                    tracing::error!("Skipping invalid cleaning rule {}: {}", pattern, e);
                    None
                }
            })
            .collect()
    })
}

/// Reduce an authoring script to speech-ready plain text.
pub fn clean_script(text: &str) -> String {
    let mut cleaned = text.replace("\r\n", "\n");
    for (re, replacement) in cleaning_rules() {
        cleaned = re.replace_all(&cleaned, *replacement).into_owned();
    }
    cleaned.trim().to_string()
}

/// Number of characters in a string.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Estimated spoken duration of a script, in whole seconds (rounded up).
pub fn estimate_duration_secs(text: &str) -> i64 {
    duration_for_chars(char_len(&clean_script(text)) as i64)
}

/// Estimated duration for an already-cleaned character count.
pub fn duration_for_chars(chars: i64) -> i64 {
    if chars <= 0 {
        return 0;
    }
    // chars / CHARS_PER_WORD words at WORDS_PER_MINUTE, in seconds, ceiling
    let numerator = chars * 60;
    let denominator = CHARS_PER_WORD * WORDS_PER_MINUTE;
    (numerator + denominator - 1) / denominator
}

/// Credits a script will consume: one per character of cleaned text.
pub fn estimate_credits(text: &str) -> i64 {
    char_len(&clean_script(text)) as i64
}

/// Truncate to at most `max_chars`, cutting back to the last word boundary.
///
/// A single word longer than `max_chars` is cut hard.
pub fn truncate_at_word_boundary(text: &str, max_chars: usize) -> &str {
    let text = text.trim();
    let Some((cut, next)) = text.char_indices().nth(max_chars) else {
        return text;
    };

    let head = &text[..cut];
    if next.is_whitespace() {
        return head.trim_end();
    }
    match head.rfind(char::is_whitespace) {
        Some(boundary) => head[..boundary].trim_end(),
        None => head,
    }
}

/// Split text into ordered chunks of at most `max_chars` characters.
///
/// Paragraphs are packed together while they fit. A paragraph that is too
/// long is split at sentence ends, and a sentence that is too long is split
/// between words. Words are never broken; a single word longer than the limit
/// becomes its own chunk.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in split_paragraphs(text) {
        if char_len(paragraph) <= max_chars {
            push_piece(&mut current, &mut chunks, paragraph, "\n\n", max_chars);
            continue;
        }

        flush(&mut current, &mut chunks);
        for sentence in split_sentences(paragraph) {
            if char_len(sentence) <= max_chars {
                push_piece(&mut current, &mut chunks, sentence, " ", max_chars);
                continue;
            }
            flush(&mut current, &mut chunks);
            for word in sentence.split_whitespace() {
                push_piece(&mut current, &mut chunks, word, " ", max_chars);
            }
            flush(&mut current, &mut chunks);
        }
        flush(&mut current, &mut chunks);
    }

    flush(&mut current, &mut chunks);
    chunks
}

fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

/// Split after `.`, `!`, `?` or `…` when followed by whitespace.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?' | '…') {
            continue;
        }
        let at_break = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
        if at_break {
            let end = idx + ch.len_utf8();
            sentences.push(paragraph[start..end].trim());
            start = end;
        }
    }
    sentences.push(paragraph[start..].trim());

    sentences.retain(|s| !s.is_empty());
    sentences
}

fn push_piece(
    current: &mut String,
    chunks: &mut Vec<String>,
    piece: &str,
    separator: &str,
    max_chars: usize,
) {
    if current.is_empty() {
        current.push_str(piece);
        return;
    }

    if char_len(current) + char_len(separator) + char_len(piece) <= max_chars {
        current.push_str(separator);
        current.push_str(piece);
    } else {
        flush(current, chunks);
        current.push_str(piece);
    }
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_cleaning_rules_compile() {
        assert_eq!(cleaning_rules().len(), CLEANING_RULES.len());
    }

    #[test]
    fn test_clean_script_strips_markdown() {
        let script = "# Episodio 7\n\n## Introducción\n\n- Primer punto\n* Segundo punto\n1. Tercer punto\n\nEsto es **muy** importante y _curioso_.";
        let cleaned = clean_script(script);
        assert_eq!(
            cleaned,
            "Episodio 7\n\nIntroducción\n\nPrimer punto\nSegundo punto\nTercer punto\n\nEsto es muy importante y curioso."
        );
    }

    #[test]
    fn test_clean_script_links_and_stage_directions() {
        let script = "[MÚSICA DE ENTRADA]\nHola, visita [ComfyUI](https://comfy.org) hoy. (pausa) ¿Listos?\n(RISAS)\n<br/>";
        let cleaned = clean_script(script);
        assert_eq!(cleaned, "Hola, visita ComfyUI hoy. ¿Listos?");
    }

    #[test]
    fn test_clean_script_keeps_ordinary_parentheses_and_punctuation() {
        let cleaned = clean_script("Usa nodos (por ejemplo, KSampler); luego guarda: ¡listo!");
        assert_eq!(cleaned, "Usa nodos (por ejemplo, KSampler); luego guarda: ¡listo!");
    }

    #[test]
    fn test_clean_script_collapses_whitespace() {
        let cleaned = clean_script("Hola    mundo\n\n\n\n\nAdiós\t\tamigos  \n---\n");
        assert_eq!(cleaned, "Hola mundo\n\nAdiós amigos");
    }

    #[test]
    fn test_clean_script_inline_code() {
        assert_eq!(clean_script("Ejecuta `python main.py` ahora"), "Ejecuta python main.py ahora");
    }

    #[test]
    fn test_duration_estimate() {
        assert_eq!(estimate_duration_secs(""), 0);
        // 750 chars = 150 words = one minute
        assert_eq!(estimate_duration_secs(&"a".repeat(750)), 60);
        // Partial seconds round up
        assert_eq!(duration_for_chars(1), 1);
        assert_eq!(duration_for_chars(13), 2);
    }

    #[test]
    fn test_credit_estimate_counts_cleaned_chars() {
        assert_eq!(estimate_credits("## Hola"), 4);
        assert_eq!(estimate_credits("ñandú"), 5);
        assert_eq!(estimate_credits(""), 0);
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        assert_eq!(truncate_at_word_boundary("hola mundo", 100), "hola mundo");
        assert_eq!(truncate_at_word_boundary("hola mundo cruel", 10), "hola mundo");
        assert_eq!(truncate_at_word_boundary("hola mundo cruel", 8), "hola");
        assert_eq!(truncate_at_word_boundary("supercalifragilístico", 5), "super");
    }

    #[test]
    fn test_chunk_short_text_is_single_chunk() {
        let chunks = chunk_text("Hola.\n\nAdiós.", 100);
        assert_eq!(chunks, vec!["Hola.\n\nAdiós."]);
        assert!(chunk_text("", 100).is_empty());
    }

    #[test]
    fn test_chunk_prefers_paragraph_boundaries() {
        let text = "Primer párrafo corto.\n\nSegundo párrafo corto.\n\nTercero.";
        let chunks = chunk_text(text, 45);
        assert_eq!(
            chunks,
            vec!["Primer párrafo corto.\n\nSegundo párrafo corto.", "Tercero."]
        );
    }

    #[test]
    fn test_chunk_splits_long_paragraph_at_sentences() {
        let text = "Una frase. Otra frase más larga! ¿Tercera frase? Final.";
        let chunks = chunk_text(text, 25);
        assert_eq!(
            chunks,
            vec!["Una frase.", "Otra frase más larga!", "¿Tercera frase? Final."]
        );
        assert!(chunks.iter().all(|c| char_len(c) <= 25));
    }

    #[test]
    fn test_chunk_never_splits_words() {
        let text = "palabra ".repeat(50);
        let chunks = chunk_text(&text, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 20);
            assert!(chunk.split_whitespace().all(|w| w == "palabra"));
        }
    }

    #[test]
    fn test_chunks_preserve_word_order() {
        let text = "Uno dos tres. Cuatro cinco seis siete ocho.\n\nNueve diez once doce. Trece catorce quince dieciséis diecisiete dieciocho diecinueve veinte.";
        let chunks = chunk_text(text, 30);
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_chunk_oversized_word_stands_alone() {
        let chunks = chunk_text("a supercalifragilístico b", 5);
        assert_eq!(chunks, vec!["a", "supercalifragilístico", "b"]);
    }
}
