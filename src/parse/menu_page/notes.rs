/// An opaque label attached to a meal.
pub type Note = String;

/// Icon file names and the label they stand for. Checked in order, the first hit wins.
static ICON_NOTES: [(&str, &str); 8] = [
    ("ampel_gruen_70x65.png", "grün (Ampel)"),
    ("ampel_gelb_70x65.png", "gelb (Ampel)"),
    ("ampel_rot_70x65.png", "rot (Ampel)"),
    ("15.png", "vegan"),
    ("43.png", "Klimaessen"),
    ("1.png", "vegetarisch"),
    ("18.png", "bio"),
    ("38.png", "MSC"),
];

/// Maps the `src` of a meal icon to its label.
///
/// The suffix has to start a path segment, otherwise `11.png` would be read as `1.png`.
pub fn note_from_icon(src: &str) -> Option<Note> {
    ICON_NOTES
        .iter()
        .find(|(suffix, _)| {
            src.strip_suffix(suffix)
                .is_some_and(|rest| rest.is_empty() || rest.ends_with('/'))
        })
        .map(|(_, note)| (*note).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traffic_light() {
        assert_eq!(
            note_from_icon("/vendor/infomax/mensen/icons/ampel_gelb_70x65.png").as_deref(),
            Some("gelb (Ampel)")
        );
    }

    #[test]
    fn test_segment_boundary() {
        assert_eq!(
            note_from_icon("/vendor/infomax/mensen/icons/1.png").as_deref(),
            Some("vegetarisch")
        );
        assert_eq!(note_from_icon("15.png").as_deref(), Some("vegan"));
        assert_eq!(note_from_icon("/icons/11.png"), None);
        assert_eq!(note_from_icon("/icons/43.png?v=2"), None);
    }
}
