//! # Naming-Convention Transforms
//!
//! Pure string functions that map between the naming conventions used by
//! data files (`snake_case` fields, `CamelCase` classes) and the sentence-case
//! keys the schema view indexes its classes and slots by.
//!
//! The word-splitting rules follow the `stringcase` conventions the schema
//! ecosystem uses: `-`, `_`, `.` and whitespace separate words, and every
//! ASCII uppercase letter starts a new word.

/// Convert to `snake_case`.
///
/// Separators (`-`, `.`, whitespace) become `_`; every ASCII uppercase
/// letter after the first character is prefixed with `_` and lowercased.
pub fn snake_case(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c == '-' || c == '.' || c.is_whitespace() { '_' } else { c })
        .collect();
    let mut chars = replaced.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = String::with_capacity(replaced.len() + 4);
    out.extend(first.to_lowercase());
    for c in chars {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert to `Sentence case`.
///
/// Separators become spaces, every ASCII uppercase letter is prefixed with a
/// space, the result is trimmed and its first character capitalised.
pub fn sentence_case(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            spaced.push(' ');
        } else if c.is_ascii_uppercase() {
            spaced.push(' ');
            spaced.push(c);
        } else {
            spaced.push(c);
        }
    }
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `PersonName` -> `person name`. Used to turn a class name into a lookup key.
pub fn camelcase_to_sentencecase(name: &str) -> String {
    sentence_case(&snake_case(name)).to_lowercase()
}

/// `first_name` -> `first name`. Used to turn a data field into a slot lookup key.
pub fn snakecase_to_sentencecase(name: &str) -> String {
    sentence_case(name).to_lowercase()
}

/// `first name` -> `first_name`.
pub fn sentencecase_to_snakecase(name: &str) -> String {
    snake_case(name.trim()).to_lowercase()
}

/// `person name` -> `PersonName`.
pub fn sentencecase_to_camelcase(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `first name` -> `first_name`, without touching case. This is how slot
/// names become JSON property names.
pub fn underscore(name: &str) -> String {
    name.trim().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("PersonName"), "person_name");
        assert_eq!(snake_case("first-name"), "first_name");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case(""), "");
    }

    #[test]
    fn test_sentence_case() {
        assert_eq!(sentence_case("first_name"), "First name");
        assert_eq!(sentence_case("firstName"), "First Name");
        assert_eq!(sentence_case("  "), "");
    }

    #[test]
    fn test_camelcase_to_sentencecase() {
        assert_eq!(camelcase_to_sentencecase("Person"), "person");
        assert_eq!(camelcase_to_sentencecase("NamedThing"), "named thing");
        assert_eq!(camelcase_to_sentencecase("person_name"), "person name");
    }

    #[test]
    fn test_snakecase_to_sentencecase() {
        assert_eq!(snakecase_to_sentencecase("first_name"), "first name");
        assert_eq!(snakecase_to_sentencecase("age"), "age");
        assert_eq!(snakecase_to_sentencecase("firstName"), "first name");
    }

    #[test]
    fn test_reverse_transforms() {
        assert_eq!(sentencecase_to_snakecase("first name"), "first_name");
        assert_eq!(sentencecase_to_camelcase("named thing"), "NamedThing");
        assert_eq!(sentencecase_to_camelcase("person"), "Person");
        assert_eq!(underscore("has employment history"), "has_employment_history");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Lowercase snake_case field names always map onto their spaced form.
        #[test]
        fn snake_to_sentence_replaces_underscores(words in prop::collection::vec("[a-z]{1,8}", 1..5)) {
            let snake = words.join("_");
            prop_assert_eq!(snakecase_to_sentencecase(&snake), words.join(" "));
        }

        /// Sentence case and snake case are inverses on lowercase words.
        #[test]
        fn sentence_snake_round_trip(words in prop::collection::vec("[a-z]{1,8}", 1..5)) {
            let sentence = words.join(" ");
            let snake = sentencecase_to_snakecase(&sentence);
            prop_assert_eq!(snakecase_to_sentencecase(&snake), sentence);
        }

        /// CamelCase class names built from words normalise to the spaced words.
        #[test]
        fn camel_to_sentence_splits_words(words in prop::collection::vec("[a-z]{1,8}", 1..5)) {
            let camel = sentencecase_to_camelcase(&words.join(" "));
            prop_assert_eq!(camelcase_to_sentencecase(&camel), words.join(" "));
        }
    }
}
