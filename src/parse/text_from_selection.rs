use scraper::{ElementRef, Selector};

/// All text below `element`, concatenated in document order.
pub fn inner_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Concatenated text of every element matching `selector` below `element`.
/// Empty when nothing matches.
pub fn text_from_selection(selector: &Selector, element: ElementRef<'_>) -> String {
    element.select(selector).flat_map(|x| x.text()).collect()
}

/// Trimmed text of the first element matching `selector`, if any.
pub fn first_text(selector: &Selector, element: ElementRef<'_>) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|x| inner_text(x).trim().to_owned())
}

pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// The next sibling that is an element, skipping text and comment nodes.
pub fn next_sibling_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}
