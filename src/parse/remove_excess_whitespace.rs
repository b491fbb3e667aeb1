use std::borrow::Cow;

use crate::static_regex;

pub fn remove_excess_whitespace(s: &str) -> Cow<'_, str> {
    static_regex!(RE <- r"\s\s+");
    RE.replace_all(s, " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs() {
        assert_eq!(remove_excess_whitespace("Hardenbergstr.   34"), "Hardenbergstr. 34");
        assert_eq!(remove_excess_whitespace("a \n\t b"), "a b");
        assert!(matches!(remove_excess_whitespace("a b"), Cow::Borrowed(_)));
    }
}
