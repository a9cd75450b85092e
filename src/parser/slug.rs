//! Identifier slugging for row labels

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization as _;

/// Derive a cell identifier from a label
///
/// Accents are stripped (NFKD + combining marks removed), letters are
/// lowercased, and every run of other characters becomes a single `_`.
/// Identifiers never start with a digit.
///
/// - `"Diamètre"` → `"diametre"`
/// - `"Surface (m²)"` → `"surface_m2"`
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_separator = false;

    for c in label.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.starts_with(|c: char| c.is_ascii_digit()) {
        slug.insert(0, '_');
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents() {
        assert_eq!(slugify("Diamètre"), "diametre");
        assert_eq!(slugify("Épaisseur"), "epaisseur");
        assert_eq!(slugify("Coût total"), "cout_total");
    }

    #[test]
    fn test_collapses_separators() {
        assert_eq!(slugify("  Surface  (m²) "), "surface_m2");
        assert_eq!(slugify("a -- b"), "a_b");
    }

    #[test]
    fn test_leading_digit() {
        assert_eq!(slugify("2nd value"), "_2nd_value");
    }

    #[test]
    fn test_nothing_left() {
        assert_eq!(slugify("%%%"), "");
    }
}
