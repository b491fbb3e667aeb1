mod daily_menu;
mod meal;
mod notes;
mod price;

pub use daily_menu::Day;
pub use meal::{Category, Meal};
pub use price::{Price, PriceMode, Role};
