mod model;
mod sync;

pub use model::Reservation;
pub use sync::{PanelVisibility, ReservationSync, SyncEvent};
