/// Derive an attribute key from a human label.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `_` and trims `_` from both ends. Non-Latin letters are kept.
pub fn slugify(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_sep = false;

    for ch in label.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_labels() {
        assert_eq!(slugify("Screen Size"), "screen_size");
        assert_eq!(slugify("  RAM (GB)  "), "ram_gb");
        assert_eq!(slugify("already_snake"), "already_snake");
    }

    #[test]
    fn cyrillic_is_preserved() {
        assert_eq!(slugify("Бренд"), "бренд");
        assert_eq!(slugify("Диагональ экрана"), "диагональ_экрана");
    }

    #[test]
    fn separators_collapse_and_trim() {
        assert_eq!(slugify("--Size -- / cm--"), "size_cm");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }
}
