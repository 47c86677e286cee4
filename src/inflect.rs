//! English-centric pluralization for deriving table names
//!
//! Table names are always the plural of the model short name; this is the
//! only naming rule the layer needs, so no full inflection library is
//! pulled in.

/// Pluralize a lowercase noun.
pub fn pluralize(name: &str) -> String {
    let vowel_y = ["ay", "ey", "iy", "oy", "uy"];
    if name.ends_with('y') && !vowel_y.iter().any(|s| name.ends_with(s)) {
        format!("{}ies", &name[..name.len() - 1])
    } else if name.ends_with('s')
        || name.ends_with("sh")
        || name.ends_with("ch")
        || name.ends_with('x')
        || name.ends_with('z')
    {
        format!("{}es", name)
    } else {
        format!("{}s", name)
    }
}

#[cfg(test)]
mod tests {
    use super::pluralize;

    #[test]
    fn pluralizes_regular_nouns() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("order"), "orders");
    }

    #[test]
    fn pluralizes_consonant_y() {
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
    }

    #[test]
    fn pluralizes_sibilant_endings() {
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("dish"), "dishes");
    }
}
