pub mod category;
pub mod event;
pub mod organizer;
pub mod participant;
pub mod rating;
pub mod subscription;
pub mod user;
pub mod venue;

pub use category::{EventCategory, NewCategory};
pub use event::{
    Event, EventDetails, EventFilter, EventOrdering, EventStatus, EventUpdate, NewEvent,
};
pub use organizer::{NewOrganizer, Organizer};
pub use participant::{NewParticipant, Participant};
pub use rating::{NewRating, Rating};
pub use subscription::Subscription;
pub use user::{NewUser, User};
pub use venue::{NewVenue, Venue};
