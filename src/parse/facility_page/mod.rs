mod canteen;
mod facilities;
mod location;
mod opening_hours;

pub use canteen::{
    direct_link, mensatogo_id, name_from_mensatogo, name_from_title, Canteen, Feed, FeedSchedule,
    NameSource,
};
pub use facilities::Facility;
pub use location::Location;
pub use opening_hours::Times;
