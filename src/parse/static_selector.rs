use std::sync::OnceLock;

use regex::Regex;
use scraper::Selector;

/// A pattern literal, compiled the first time it is dereferenced.
pub struct Compiled<T> {
    cell: OnceLock<T>,
    source: &'static str,
    compile: fn(&str) -> Result<T, String>,
}

pub type StaticSelector = Compiled<Selector>;
pub type StaticRegex = Compiled<Regex>;

impl<T> Compiled<T> {
    pub const fn new(source: &'static str, compile: fn(&str) -> Result<T, String>) -> Self {
        Self {
            cell: OnceLock::new(),
            source,
            compile,
        }
    }
}

impl<T> core::ops::Deref for Compiled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // literals are part of the program, a bad one is a bug
        self.cell.get_or_init(|| {
            (self.compile)(self.source)
                .unwrap_or_else(|e| panic!("Error compiling static pattern {:?}: {e}", self.source))
        })
    }
}

impl<T> std::fmt::Debug for Compiled<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Compiled").field(&self.source).finish()
    }
}

pub fn selector(source: &str) -> Result<Selector, String> {
    Selector::parse(source).map_err(|e| format!("{e:?}"))
}

pub fn regex(source: &str) -> Result<Regex, String> {
    Regex::new(source).map_err(|e| e.to_string())
}

#[macro_export]
macro_rules! static_selector {
    ($x: ident <- $sel: literal) => {
        static $x: $crate::parse::static_selector::StaticSelector =
            $crate::parse::static_selector::Compiled::new(
                $sel,
                $crate::parse::static_selector::selector,
            );
    };
}

#[macro_export]
macro_rules! static_regex {
    ($x: ident <- $re: literal) => {
        static $x: $crate::parse::static_selector::StaticRegex =
            $crate::parse::static_selector::Compiled::new($re, $crate::parse::static_selector::regex);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_once() {
        static_regex!(DIGITS <- r"\d+");
        assert!(DIGITS.is_match("a1"));
        assert!(std::ptr::eq(&*DIGITS, &*DIGITS));
    }

    #[test]
    #[should_panic(expected = "Error compiling static pattern")]
    fn test_bad_selector_panics() {
        static_selector!(BROKEN <- "div[");
        let _ = &*BROKEN;
    }
}
