mod error;
mod facility_page;
mod menu_page;
pub use error::Error;
mod remove_excess_whitespace;
pub mod static_selector;
mod text_from_selection;

pub use facility_page::{
    direct_link, mensatogo_id, name_from_mensatogo, name_from_title, Canteen, Facility, Feed,
    FeedSchedule, Location, NameSource, Times,
};
pub use menu_page::{Category, Day, Meal, Price, PriceMode, Role};
pub use remove_excess_whitespace::remove_excess_whitespace;
