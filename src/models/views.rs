use super::{Payment, Ride, TaxiUser, TokenAmount};
use chrono::NaiveDate;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWithUser {
    #[serde(flatten)]
    pub payment: Payment,
    /// Payer's username, or their hex address when it could not be resolved.
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideWithPayments {
    #[serde(flatten)]
    pub ride: Ride,
    pub payments: Vec<PaymentWithUser>,
    pub total_earnings: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDashboard {
    pub user: TaxiUser,
    pub balance: TokenAmount,
    /// Rides still in progress, each joined with the payments received so far.
    pub rides: Vec<RideWithPayments>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerPayment {
    #[serde(flatten)]
    pub payment: Payment,
    pub ride: Option<Ride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDateGroup {
    /// UTC calendar day; `None` collects payments with unrepresentable timestamps.
    pub date: Option<NaiveDate>,
    pub payments: Vec<PassengerPayment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerDashboard {
    pub user: TaxiUser,
    pub balance: TokenAmount,
    pub open_rides: Vec<Ride>,
    pub payments_by_date: Vec<PaymentDateGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGroup {
    pub month: u32,
    pub month_name: String,
    /// Whether the section is shown open.
    #[serde(default)]
    pub expanded: bool,
    pub rides: Vec<Ride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearGroup {
    pub year: i32,
    pub months: Vec<MonthGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRides {
    pub driver: Address,
    pub years: Vec<YearGroup>,
    /// Completed rides whose `updated_at` cannot be placed on a calendar.
    pub undated: Vec<Ride>,
}

impl CompletedRides {
    /// Marks each month section open or closed according to `state`.
    pub fn apply_expansion(&mut self, state: &ExpansionState) {
        for year in &mut self.years {
            for month in &mut year.months {
                month.expanded = state.is_expanded(year.year, month.month);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HomeView {
    Unregistered { wallet_address: Address },
    Driver(DriverDashboard),
    Passenger(PassengerDashboard),
}

/// Expand/collapse state of the year/month sections of a completed-rides list.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<(i32, u32)>,
}

impl ExpansionState {
    /// Flips a section and returns its new state.
    pub fn toggle(&mut self, year: i32, month: u32) -> bool {
        if self.expanded.remove(&(year, month)) {
            false
        } else {
            self.expanded.insert((year, month));
            true
        }
    }

    /// Opens a section; unlike `toggle`, repeating it keeps the section open.
    pub fn expand(&mut self, year: i32, month: u32) {
        self.expanded.insert((year, month));
    }

    pub fn is_expanded(&self, year: i32, month: u32) -> bool {
        self.expanded.contains(&(year, month))
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}
