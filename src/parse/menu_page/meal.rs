use scraper::ElementRef;

use super::notes::{note_from_icon, Note};
use super::price::{Price, PriceMode};
use crate::parse::text_from_selection::{first_text, inner_text, text_from_selection};
use crate::static_selector;

/// Stand-in for meals the upstream lists without a name.
pub const NAME_PLACEHOLDER: &str = "N. N.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    pub name: String,
    pub prices: Vec<Price>,
    pub notes: Vec<Note>,
}

impl Meal {
    /// `context` names the canteen, date and category for log lines.
    pub fn from_html_element(element: ElementRef<'_>, price_mode: PriceMode, context: &str) -> Self {
        static_selector!(NAME_SELECTOR <- "span.bold");
        static_selector!(PRICE_SELECTOR <- "div.text-right");
        static_selector!(ICON_SELECTOR <- "img.splIcon");
        static_selector!(NOTE_SELECTOR <- "div.kennz td:not(.text-right)");

        let name = match first_text(&NAME_SELECTOR, element) {
            Some(name) if !name.is_empty() => name,
            _ => {
                log::warn!("{context}: encountered a meal without a name tag");
                NAME_PLACEHOLDER.to_owned()
            }
        };

        let price_text = text_from_selection(&PRICE_SELECTOR, element);
        let prices = price_mode
            .extract(price_text.trim())
            .unwrap_or_else(|e| {
                log::warn!("{context}: {name}: {e}");
                vec![]
            });

        let mut notes: Vec<Note> = element
            .select(&ICON_SELECTOR)
            .filter_map(|icon| icon.value().attr("src"))
            .filter_map(note_from_icon)
            .collect();
        notes.extend(
            element
                .select(&NOTE_SELECTOR)
                .map(|cell| inner_text(cell).trim().to_owned())
                .filter(|note| !note.is_empty()),
        );

        Self {
            name,
            prices,
            notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub meals: Vec<Meal>,
}

impl Category {
    pub fn new(name: impl Into<String>, meals: Vec<Meal>) -> Self {
        Self {
            name: name.into(),
            meals,
        }
    }

    pub fn from_html_element(element: ElementRef<'_>, price_mode: PriceMode, context: &str) -> Self {
        static_selector!(CATEGORY_NAME_SELECTOR <- "div.splGroup");
        static_selector!(MEAL_SELECTOR <- "div.splMeal");

        let name = first_text(&CATEGORY_NAME_SELECTOR, element).unwrap_or_default();
        let context = format!("{context}: {name}");
        let meals = element
            .select(&MEAL_SELECTOR)
            .map(|meal| Meal::from_html_element(meal, price_mode, &context))
            .collect();
        Self::new(name, meals)
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::menu_page::price::Role;
    use std::fs;

    fn load_category(price_mode: PriceMode) -> Category {
        let html = fs::read_to_string("./src/parse/html_examples/menu_page/category.html").unwrap();
        let doc = scraper::Html::parse_document(&html);
        static_selector!(WRAPPER_SELECTOR <- "div.splGroupWrapper");
        let wrapper = doc.select(&WRAPPER_SELECTOR).next().unwrap();
        Category::from_html_element(wrapper, price_mode, "321: 2024-04-08")
    }

    #[test]
    fn test_category_from_html_element() {
        let category = load_category(PriceMode::Scan);
        assert_eq!(category.name, "Essen");
        assert_eq!(category.meals.len(), 3);

        let first = &category.meals[0];
        assert_eq!(first.name, "Gemüsecurry mit Reis");
        assert_eq!(
            first
                .prices
                .iter()
                .map(|p| (p.amount.as_str(), p.role))
                .collect::<Vec<_>>(),
            vec![
                ("2.10", Role::Student),
                ("3.20", Role::Employee),
                ("4.00", Role::Other)
            ]
        );
        assert_eq!(first.notes, vec!["grün (Ampel)", "vegan", "Sellerie", "Senf"]);
    }

    #[test]
    fn test_meal_without_name_or_prices() {
        let category = load_category(PriceMode::Scan);
        let second = &category.meals[1];
        assert_eq!(second.name, NAME_PLACEHOLDER);
        assert_eq!(second.prices.len(), 1);
        assert_eq!(second.prices[0].role, Role::Other);
        assert_eq!(second.prices[0].amount, "0.80");

        // two prices is not a shape we know, the meal is kept without any
        let third = &category.meals[2];
        assert_eq!(third.name, "Eintopf");
        assert!(third.prices.is_empty());
        assert_eq!(third.notes, vec!["rot (Ampel)"]);
    }

    #[test]
    fn test_slash_mode_on_same_markup() {
        let category = load_category(PriceMode::Slash);
        let second = &category.meals[1];
        assert_eq!(second.prices.len(), 3);
        assert!(second.prices.iter().all(|p| p.amount == "0.80"));
    }
}
