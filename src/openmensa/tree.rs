use crate::parse::{Canteen, Category, Day, Feed, Location, Meal, Price, Times};

/// A plain XML element, independent of any XML library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: &'static str,
    pub attributes: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: vec![],
            text: None,
            children: vec![],
        }
    }

    pub fn text_element(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Adds a text child unless `text` is empty.
    #[must_use]
    pub fn non_empty(self, name: &'static str, text: &str) -> Self {
        if text.is_empty() {
            self
        } else {
            self.child(Self::text_element(name, text))
        }
    }
}

pub static VERSION: &str = "2.1";
pub static NAMESPACE: &str = "http://openmensa.org/open-mensa-v2";
static XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
static SCHEMA_LOCATION: &str =
    "http://openmensa.org/open-mensa-v2 http://openmensa.org/open-mensa-v2.xsd";

static WEEKDAY_ELEMENTS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// The `openmensa` root around a single canteen.
pub fn document(canteen: &Canteen) -> Element {
    Element::new("openmensa")
        .attribute("version", VERSION)
        .attribute("xmlns", NAMESPACE)
        .attribute("xmlns:xsi", XSI_NAMESPACE)
        .attribute("xsi:schemaLocation", SCHEMA_LOCATION)
        .child(self::canteen(canteen))
}

pub fn canteen(canteen: &Canteen) -> Element {
    let mut element = Element::new("canteen")
        .non_empty("name", &canteen.name)
        .non_empty("address", &canteen.address)
        .non_empty("city", &canteen.city)
        .non_empty("phone", &canteen.phone)
        .non_empty("email", &canteen.email);
    if let Some(location) = &canteen.location {
        element = element.child(location_element(location));
    }
    if let Some(availability) = &canteen.availability {
        element = element.child(Element::text_element("availability", availability));
    }
    if let Some(times) = &canteen.times {
        element = element.child(times_element(times));
    }
    element
        .children(canteen.feeds.iter().map(feed))
        .children(canteen.days.iter().map(day))
}

fn location_element(location: &Location) -> Element {
    Element::new("location")
        .attribute("latitude", &location.latitude)
        .attribute("longitude", &location.longitude)
}

/// All seven weekdays in order, each either open or closed.
pub fn times_element(times: &Times) -> Element {
    Element::new("times")
        .attribute("type", "opening")
        .children(times.slots().iter().zip(WEEKDAY_ELEMENTS).map(|(slot, name)| {
            match slot {
                Some(hours) => Element::new(name).attribute("open", hours),
                None => Element::new(name).attribute("closed", "true"),
            }
        }))
}

pub fn feed(feed: &Feed) -> Element {
    let mut element = Element::new("feed").attribute("name", &feed.name);
    if let Some(schedule) = &feed.schedule {
        let mut schedule_element = Element::new("schedule").attribute("hour", &schedule.hour);
        if let Some(retry) = &schedule.retry {
            schedule_element = schedule_element.attribute("retry", retry);
        }
        element = element.child(schedule_element);
    }
    element = element.child(Element::text_element("url", &feed.url));
    match &feed.source {
        Some(source) => element.non_empty("source", source),
        None => element,
    }
}

/// A day without meals is closed, categories without meals are left out.
pub fn day(day: &Day) -> Element {
    let element = Element::new("day").attribute("date", day.date.format("%Y-%m-%d").to_string());
    if day.is_closed() {
        element.child(Element::new("closed"))
    } else {
        element.children(
            day.categories
                .iter()
                .filter(|c| !c.is_empty())
                .map(category),
        )
    }
}

fn category(category: &Category) -> Element {
    Element::new("category")
        .attribute("name", &category.name)
        .children(category.meals.iter().map(meal))
}

fn meal(meal: &Meal) -> Element {
    Element::new("meal")
        .child(Element::text_element("name", &meal.name))
        .children(meal.notes.iter().map(|note| Element::text_element("note", note)))
        .children(meal.prices.iter().map(price))
}

fn price(price: &Price) -> Element {
    Element::text_element("price", &price.amount).attribute("role", price.role.as_str())
}
