pub mod config;
pub mod domain;
pub mod errors;
pub mod inventory;
pub mod ticket;

pub use domain::booking::{Booking, CustomerDetails, TicketId};
pub use domain::slot::{Slot, SlotTime};
pub use errors::DomainError;
pub use inventory::SlotStore;
pub use ticket::TicketGenerator;
