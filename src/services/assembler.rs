//! Joins and groups fetched records into the dashboards' view-models.
//!
//! The pure functions in this module do the shaping; [`ViewAssembler`] fetches
//! what each view needs and feeds them. No step is atomic: a failed lookup
//! shows up as missing data, never as an error.

use crate::{
    models::{
        CompletedRides, DriverDashboard, ExpansionState, HomeView, MonthGroup, PassengerDashboard,
        PassengerPayment, Payment, PaymentDateGroup, PaymentWithUser, Ride, RideWithPayments,
        TaxiUser, TokenAmount, YearGroup,
    },
    services::{fetcher::RecordFetcher, ledger::ChainContext},
};
use chrono::{Datelike, NaiveDate};
use ethers::types::{Address, U256};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Wallet address → username, resolved once per assembled view.
#[derive(Debug, Clone, Default)]
pub struct UsernameDirectory {
    names: HashMap<Address, String>,
}

impl UsernameDirectory {
    /// Looks up every distinct wallet once, concurrently.
    pub async fn resolve<I>(fetcher: &RecordFetcher, wallets: I) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        let unique: BTreeSet<Address> = wallets.into_iter().collect();
        let lookups = unique.into_iter().map(|wallet| async move {
            (wallet, fetcher.get_user_by_wallet_address(wallet).await)
        });

        let users = join_all(lookups).await;
        tracing::debug!(lookups = users.len(), "Resolved payer usernames");

        Self::from_users(users.into_iter().filter_map(|(_, user)| user))
    }

    pub fn from_users<I>(users: I) -> Self
    where
        I: IntoIterator<Item = TaxiUser>,
    {
        let names = users
            .into_iter()
            .filter(|u| !u.username.is_empty())
            .map(|u| (u.wallet_address, u.username))
            .collect();
        Self { names }
    }

    /// Username, or the full hex address when the wallet could not be resolved.
    pub fn display_name(&self, wallet: Address) -> String {
        self.names
            .get(&wallet)
            .cloned()
            .unwrap_or_else(|| format!("{:?}", wallet))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn total_earnings<'a, I>(payments: I) -> TokenAmount
where
    I: IntoIterator<Item = &'a Payment>,
{
    payments.into_iter().map(|p| p.amount_paid_in_ethers).sum()
}

/// Attaches every real payment to the ride it names.
///
/// Placeholder payments are dropped, and so are payments whose ride is not in
/// `rides`. Each remaining payment ends up under exactly one ride.
pub fn join_payments(
    rides: Vec<Ride>,
    payments: Vec<Payment>,
    names: &UsernameDirectory,
) -> Vec<RideWithPayments> {
    let mut by_ride: HashMap<U256, Vec<Payment>> = HashMap::new();
    for payment in payments.into_iter().filter(|p| !p.is_placeholder()) {
        by_ride.entry(payment.ride_id).or_default().push(payment);
    }

    rides
        .into_iter()
        .map(|ride| {
            let payments = by_ride.remove(&ride.id).unwrap_or_default();
            let total_earnings = total_earnings(&payments);
            let payments = payments
                .into_iter()
                .map(|payment| PaymentWithUser {
                    username: names.display_name(payment.passenger_wallet_address),
                    payment,
                })
                .collect();
            RideWithPayments {
                ride,
                payments,
                total_earnings,
            }
        })
        .collect()
}

/// Buckets payments by the UTC calendar day they were made on.
///
/// Lossless: every input payment lands in exactly one bucket, payments with an
/// unrepresentable timestamp under `None`.
pub fn group_payments_by_date(payments: Vec<Payment>) -> BTreeMap<Option<NaiveDate>, Vec<Payment>> {
    let mut groups: BTreeMap<Option<NaiveDate>, Vec<Payment>> = BTreeMap::new();
    for payment in payments {
        let day = payment.paid_at_datetime().map(|dt| dt.date_naive());
        groups.entry(day).or_default().push(payment);
    }
    groups
}

/// Buckets rides by the year, then month, of their last update.
///
/// Rides whose `updated_at` cannot be placed on a calendar are returned separately.
pub fn group_rides_by_year_month(rides: Vec<Ride>) -> (Vec<YearGroup>, Vec<Ride>) {
    let mut buckets: BTreeMap<i32, BTreeMap<u32, Vec<Ride>>> = BTreeMap::new();
    let mut undated = Vec::new();

    for ride in rides {
        match ride.updated_at_datetime() {
            Some(dt) => buckets
                .entry(dt.year())
                .or_default()
                .entry(dt.month())
                .or_default()
                .push(ride),
            None => undated.push(ride),
        }
    }

    let years = buckets
        .into_iter()
        .map(|(year, months)| YearGroup {
            year,
            months: months
                .into_iter()
                .map(|(month, rides)| MonthGroup {
                    month,
                    month_name: month_name(year, month),
                    expanded: false,
                    rides,
                })
                .collect(),
        })
        .collect();

    (years, undated)
}

fn month_name(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_default()
}

pub struct ViewAssembler {
    fetcher: RecordFetcher,
}

impl ViewAssembler {
    pub fn new(chain: ChainContext) -> Self {
        Self {
            fetcher: RecordFetcher::new(chain),
        }
    }

    pub fn fetcher(&self) -> &RecordFetcher {
        &self.fetcher
    }

    /// Decides which dashboard a connected wallet lands on.
    pub async fn home(&self, wallet: Address) -> HomeView {
        if !self.fetcher.check_if_user_exists(wallet).await {
            return HomeView::Unregistered {
                wallet_address: wallet,
            };
        }
        match self.fetcher.get_user_by_wallet_address(wallet).await {
            Some(user) if user.is_driver => HomeView::Driver(self.driver_view(user).await),
            Some(user) => HomeView::Passenger(self.passenger_view(user).await),
            None => HomeView::Unregistered {
                wallet_address: wallet,
            },
        }
    }

    /// `None` unless `driver` is registered as a driver.
    pub async fn driver_dashboard(&self, driver: Address) -> Option<DriverDashboard> {
        let user = self.fetcher.get_user_by_wallet_address(driver).await?;
        if !user.is_driver {
            tracing::debug!(wallet = ?driver, "Driver dashboard requested for a passenger");
            return None;
        }
        Some(self.driver_view(user).await)
    }

    /// `None` unless `passenger` is registered as a passenger.
    pub async fn passenger_dashboard(&self, passenger: Address) -> Option<PassengerDashboard> {
        let user = self.fetcher.get_user_by_wallet_address(passenger).await?;
        if user.is_driver {
            tracing::debug!(wallet = ?passenger, "Passenger dashboard requested for a driver");
            return None;
        }
        Some(self.passenger_view(user).await)
    }

    /// A completed ride with its payments and total earnings.
    ///
    /// `None` for unknown rides and for rides still in progress.
    pub async fn ride_overview(&self, ride_id: U256) -> Option<RideWithPayments> {
        let ride = self.fetcher.get_ride_by_id(ride_id).await?;
        if !ride.is_completed {
            tracing::debug!(ride_id = %ride_id, "Overview requested for a ride in progress");
            return None;
        }

        let payments = self.fetcher.get_payments_by_ride_id(ride.id).await;
        let names = self.resolve_payers(&payments).await;
        join_payments(vec![ride], payments, &names).pop()
    }

    /// The driver's completed rides by year and month, sections opened per `expansion`.
    pub async fn completed_rides(
        &self,
        driver: Address,
        expansion: &ExpansionState,
    ) -> CompletedRides {
        let rides = self
            .fetcher
            .get_all_rides()
            .await
            .into_iter()
            .filter(|r| r.is_completed && r.driver_wallet_address == driver)
            .collect();
        let (years, undated) = group_rides_by_year_month(rides);
        let mut completed = CompletedRides {
            driver,
            years,
            undated,
        };
        completed.apply_expansion(expansion);
        completed
    }

    async fn driver_view(&self, user: TaxiUser) -> DriverDashboard {
        let driver = user.wallet_address;
        let (rides, balance) = futures::join!(
            self.fetcher.get_driver_rides(driver),
            self.fetcher.get_balance(driver)
        );
        let rides: Vec<Ride> = rides.into_iter().filter(|r| !r.is_completed).collect();

        let per_ride = join_all(
            rides
                .iter()
                .map(|ride| self.fetcher.get_payments_by_ride_id(ride.id)),
        )
        .await;
        let payments: Vec<Payment> = per_ride.into_iter().flatten().collect();
        let names = self.resolve_payers(&payments).await;

        tracing::debug!(
            driver = ?driver,
            rides = rides.len(),
            payments = payments.len(),
            "Assembled driver dashboard"
        );

        DriverDashboard {
            user,
            balance: balance.unwrap_or_default(),
            rides: join_payments(rides, payments, &names),
        }
    }

    async fn passenger_view(&self, user: TaxiUser) -> PassengerDashboard {
        let passenger = user.wallet_address;
        let (rides, payments, balance) = futures::join!(
            self.fetcher.get_all_rides(),
            self.fetcher.get_user_payments(passenger),
            self.fetcher.get_balance(passenger)
        );

        let payments_by_date = group_payments_by_date(payments)
            .into_iter()
            .map(|(date, payments)| PaymentDateGroup {
                date,
                payments: payments
                    .into_iter()
                    .map(|payment| PassengerPayment {
                        ride: rides.iter().find(|r| r.id == payment.ride_id).cloned(),
                        payment,
                    })
                    .collect(),
            })
            .collect();

        PassengerDashboard {
            user,
            balance: balance.unwrap_or_default(),
            open_rides: rides.into_iter().filter(|r| !r.is_completed).collect(),
            payments_by_date,
        }
    }

    async fn resolve_payers(&self, payments: &[Payment]) -> UsernameDirectory {
        let payers = payments
            .iter()
            .filter(|p| !p.is_placeholder())
            .map(|p| p.passenger_wallet_address);
        UsernameDirectory::resolve(&self.fetcher, payers).await
    }
}
