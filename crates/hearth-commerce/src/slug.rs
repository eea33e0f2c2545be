//! URL slug generation.

/// Turn a title into a URL slug.
///
/// Letters and digits are lowercased and kept; apostrophes are dropped;
/// every other run of characters becomes a single `-`. Lowercasing can
/// expand a letter into combining marks, which are dropped. Leading and
/// trailing separators are trimmed. Applying it to its own output returns
/// the same string.
///
/// ```
/// use hearth_commerce::slug::slugify;
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("hello-world"), "hello-world");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if !c.is_alphanumeric() {
            pending_dash = true;
            continue;
        }
        for lower in c.to_lowercase().filter(|l| l.is_alphanumeric()) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(lower);
        }
    }

    slug
}

/// Candidate slugs for `base`, in allocation order: `base`, `base-2`, `base-3`, …
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((2..).map(move |n| format!("{}-{}", base, n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Mango   Pickle  "), "mango-pickle");
        assert_eq!(slugify("Mom's Garlic & Chilli (500g)"), "moms-garlic-chilli-500g");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for input in ["Hello World", "A--B__C", "Ghee, Pure!", "Nimbu Achaar 2.0", "Crème Brûlée"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_slugify_drops_marks_from_lowercasing() {
        // 'İ' lowercases to 'i' followed by a combining dot above.
        let once = slugify("İstanbul Spice");
        assert_eq!(once, "istanbul-spice");
        assert_eq!(slugify(&once), once);

        for input in ["Ǆemal Čaj", "ΣΟΦΙΑ Tea", "Ⅻ Masala", "Straße Brot"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {:?}", input);
            assert!(!once.starts_with('-') && !once.ends_with('-'));
        }
    }

    #[test]
    fn test_candidates() {
        let first: Vec<String> = candidates("ghee").take(3).collect();
        assert_eq!(first, vec!["ghee", "ghee-2", "ghee-3"]);
    }
}
