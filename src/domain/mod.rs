//! Pure decision logic: precondition guards for writes and read-side
//! aggregate projections. Nothing here touches the store; callers read the
//! rows they need first and pass the results in.

pub mod guards;
pub mod stats;

pub use guards::{check_rating, check_registration, GuardError, RatingSnapshot, RegistrationSnapshot};
pub use stats::{average_score, Statistics};
