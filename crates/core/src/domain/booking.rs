use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::slot::SlotTime;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub String);

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer-supplied half of a booking request. All fields are required at
/// the protocol boundary; nothing here is defaulted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_name: String,
    pub phone: String,
    pub car_model: String,
    pub service_type: String,
}

/// Immutable record of a confirmed booking. Created only after the inventory
/// has reserved the slot; identity is the ticket id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub ticket_id: TicketId,
    pub customer_name: String,
    pub phone: String,
    pub car_model: String,
    pub service_type: String,
    pub date: NaiveDate,
    pub time: SlotTime,
}

impl Booking {
    /// Pure assembly: the slot has already been proven available and reserved
    /// by the inventory, so there is no failure path here.
    pub fn confirm(
        ticket_id: TicketId,
        customer: CustomerDetails,
        date: NaiveDate,
        time: SlotTime,
    ) -> Self {
        Self {
            ticket_id,
            customer_name: customer.customer_name,
            phone: customer.phone,
            car_model: customer.car_model,
            service_type: customer.service_type,
            date,
            time,
        }
    }
}
