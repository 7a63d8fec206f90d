/// Derive a URL-safe slug from a post title: lowercase, accents folded to
/// ASCII, punctuation stripped, words joined by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if let Some(folded) = fold_accent(c) {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push_str(folded);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
        // Anything else (punctuation, symbols) is dropped outright.
    }

    slug
}

/// Fold the common Latin accented characters to their ASCII base.
fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => "a",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => "o",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ñ' => "n",
        'ç' => "c",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_joins_with_hyphens() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn lowercases_everything() {
        assert_eq!(slugify("RUST Is Great"), "rust-is-great");
    }

    #[test]
    fn collapses_repeated_separators() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("one___two"), "one-two");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  spaced out  "), "spaced-out");
        assert_eq!(slugify("--dashed--"), "dashed");
    }

    #[test]
    fn folds_accents_to_ascii() {
        assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
        assert_eq!(slugify("Año Nuevo"), "ano-nuevo");
    }

    #[test]
    fn drops_symbols_entirely() {
        assert_eq!(slugify("100% Pure & Simple"), "100-pure-simple");
    }

    #[test]
    fn empty_and_all_punctuation_yield_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Top 10 Posts of 2025"), "top-10-posts-of-2025");
    }
}
