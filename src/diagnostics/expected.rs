//! Rendering of the "expected" half of a syntax error.
//!
//! Alternatives arrive as raw token images from the parser generator
//! (`"\"num\""`, `"<IDENTIFIER>"`, `"<OP_SUM>"`). They are first reduced to a
//! sorted set of readable descriptions, then matched against a short list of
//! well-known sets that get a canned phrase.

use std::collections::BTreeSet;

type Alternatives = BTreeSet<String>;

const TYPE_KEYWORDS: [&str; 4] = ["'num'", "'real'", "'text'", "'flag'"];

const INITIALIZER: [&str; 3] = ["';'", "'='", "'['"];

const STATEMENT_KEYWORDS: [&str; 5] = ["'set'", "'read'", "'write'", "'if'", "'repeat'"];

const ARRAY_INDEX: [&str; 2] = ["')'", "'['"];

const OPERATORS: [&str; 18] = [
    "'+'", "'-'", "'*'", "'/'", "'%'", "'%%'", "'**'", "'=='", "'!='", "'<<'", "'>>'", "'<<='",
    "'>>='", "'<'", "'>'", "'&'", "'|'", "'!'",
];

fn describe(image: &str) -> String {
    match image {
        "<IDENTIFIER>" => "an identifier".to_string(),
        "<CONST_INT>" => "an integer number".to_string(),
        "<CONST_REAL>" => "a real number".to_string(),
        "<CONST_LITERAL>" => "a string".to_string(),
        "<EOF>" => "end of file".to_string(),
        _ => {
            let image = image.replace('"', "'");
            if image.len() > 2 && image.starts_with('<') && image.ends_with('>') {
                image[1..image.len() - 1].to_string()
            } else {
                image
            }
        }
    }
}

fn set_of(items: &[&str]) -> Alternatives {
    items.iter().map(|s| s.to_string()).collect()
}

fn has_operator(expected: &Alternatives) -> bool {
    OPERATORS.iter().any(|op| expected.contains(*op))
}

fn canned(expected: &Alternatives) -> Option<&'static str> {
    let mut statement = set_of(&STATEMENT_KEYWORDS);
    statement.insert("'end'".to_string());

    if *expected == set_of(&TYPE_KEYWORDS) {
        Some("identifier type")
    } else if *expected == set_of(&INITIALIZER) {
        Some("';' or initializer")
    } else if *expected == statement {
        Some("'end;' or statement")
    } else if expected.contains("'then'") && has_operator(expected) {
        Some("then or expression")
    } else if expected.contains("';'") && has_operator(expected) {
        Some("';' or expression")
    } else if *expected == set_of(&ARRAY_INDEX) {
        Some("')' or array index")
    } else {
        None
    }
}

fn join(expected: &Alternatives) -> String {
    let items: Vec<&str> = expected.iter().map(String::as_str).collect();

    match items.as_slice() {
        [] => "a valid construct".to_string(),
        [single] => single.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Human readable rendering of a set of expected token images.
pub fn describe_expected<S: AsRef<str>>(alternatives: &[S]) -> String {
    let expected: Alternatives = alternatives
        .iter()
        .map(|image| describe(image.as_ref()))
        .collect();

    match canned(&expected) {
        Some(phrase) => phrase.to_string(),
        None => join(&expected),
    }
}

#[cfg(test)]
mod tests {
    use super::describe_expected;

    #[test]
    fn type_keywords() {
        let expected = ["\"flag\"", "\"num\"", "\"real\"", "\"text\""];
        assert_eq!(describe_expected(&expected), "identifier type");
    }

    #[test]
    fn initializer() {
        assert_eq!(
            describe_expected(&["\";\"", "\"=\"", "\"[\""]),
            "';' or initializer"
        );
    }

    #[test]
    fn statement_or_end() {
        let expected = [
            "\"end\"", "\"set\"", "\"read\"", "\"write\"", "\"if\"", "\"repeat\"",
        ];
        assert_eq!(describe_expected(&expected), "'end;' or statement");
    }

    #[test]
    fn then_beats_semicolon() {
        let expected = ["\"then\"", "\";\"", "\"+\""];
        assert_eq!(describe_expected(&expected), "then or expression");
    }

    #[test]
    fn semicolon_or_expression() {
        let expected = ["\";\"", "\"*\"", "\"==\"", "\",\""];
        assert_eq!(describe_expected(&expected), "';' or expression");
    }

    #[test]
    fn array_index() {
        assert_eq!(
            describe_expected(&["\")\"", "\"[\""]),
            "')' or array index"
        );
    }

    #[test]
    fn fallbacks() {
        let none: [&str; 0] = [];
        assert_eq!(describe_expected(&none), "a valid construct");
        assert_eq!(describe_expected(&["<IDENTIFIER>"]), "an identifier");
        assert_eq!(
            describe_expected(&["<EOF>", "<CONST_INT>", "\")\""]),
            "')', an integer number or end of file"
        );
    }

    #[test]
    fn angle_brackets_are_unwrapped() {
        assert_eq!(describe_expected(&["<OP_SUM>"]), "OP_SUM");
        assert_eq!(describe_expected(&["\"<\""]), "'<'");
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(describe_expected(&["\"(\"", "\"(\""]), "'('");
    }
}
