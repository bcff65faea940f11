use cashless_taxi::{
    models::{ExpansionState, HomeView, NewRide, RegistrationForm, TokenAmount},
    services::{ChainContext, InMemoryLedger, MutationSubmitter, RecordFetcher, ViewAssembler},
};
use ethers::types::{Address, U256};
use std::sync::Arc;
use tokio_test::assert_ok;

fn driver() -> Address {
    Address::repeat_byte(0xd1)
}

fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

fn submitter_for(ledger: &InMemoryLedger, wallet: Address) -> MutationSubmitter {
    MutationSubmitter::new(ChainContext::new(Arc::new(ledger.connect(wallet))))
}

fn reader(ledger: &InMemoryLedger) -> ViewAssembler {
    ViewAssembler::new(ChainContext::new(Arc::new(ledger.clone())))
}

fn form(username: &str, email: &str, role: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.to_string(),
        email_address: email.to_string(),
        role: role.to_string(),
    }
}

fn ride_offer(fare: TokenAmount, seats: u64) -> NewRide {
    NewRide {
        destination: "Victoria Island".to_string(),
        fare_in_ethers: fare,
        num_passengers: U256::from(seats),
        driver_name: "Tunde Bakare".to_string(),
        license_plate: "LAG-442-KJ".to_string(),
    }
}

/// Driver with one 5 cUSD ride for two; Alice and Bob registered and funded.
async fn seeded() -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    assert!(
        submitter_for(&ledger, driver())
            .create_user(driver(), &form("tunde_drives", "tunde@example.com", "driver"))
            .await
    );
    assert!(
        submitter_for(&ledger, alice())
            .create_user(alice(), &form("alice_rides", "alice@example.com", "passenger"))
            .await
    );
    assert!(
        submitter_for(&ledger, bob())
            .create_user(bob(), &form("bobby_rides", "bob@example.com", "passenger"))
            .await
    );
    assert!(
        submitter_for(&ledger, driver())
            .create_ride(driver(), &ride_offer(TokenAmount::from_tokens(5), 2))
            .await
    );
    assert_ok!(ledger.mint(alice(), TokenAmount::from_tokens(20)));
    assert_ok!(ledger.mint(bob(), TokenAmount::from_tokens(20)));
    ledger
}

#[tokio::test]
async fn invalid_input_is_never_submitted() {
    let ledger = seeded().await;
    let before = ledger.submissions();
    let driver_tx = submitter_for(&ledger, driver());

    assert!(
        !driver_tx
            .create_ride(driver(), &ride_offer(TokenAmount::zero(), 2))
            .await
    );
    assert!(
        !driver_tx
            .create_ride(driver(), &ride_offer(TokenAmount::from_tokens(5), 0))
            .await
    );
    assert!(
        !submitter_for(&ledger, Address::repeat_byte(0x77))
            .create_user(Address::repeat_byte(0x77), &form("short", "x@example.com", "driver"))
            .await
    );
    // three seats on a ride for two
    assert!(
        !submitter_for(&ledger, alice())
            .pay_for_ride(alice(), U256::one(), U256::from(3))
            .await
    );

    assert_eq!(ledger.submissions(), before);
}

#[tokio::test]
async fn payments_show_up_on_driver_dashboard() {
    let ledger = seeded().await;
    let ride_id = U256::one();

    assert!(
        submitter_for(&ledger, alice())
            .pay_for_ride(alice(), ride_id, U256::one())
            .await
    );
    assert!(
        submitter_for(&ledger, bob())
            .pay_for_ride(bob(), ride_id, U256::one())
            .await
    );

    let views = reader(&ledger);
    let dashboard = views
        .driver_dashboard(driver())
        .await
        .expect("driver is registered");

    assert_eq!(dashboard.balance, TokenAmount::from_tokens(10));
    assert_eq!(dashboard.rides.len(), 1);

    let ride = &dashboard.rides[0];
    assert_eq!(ride.total_earnings, TokenAmount::from_tokens(10));
    assert!(ride.ride.is_paid);
    let mut payers: Vec<&str> = ride.payments.iter().map(|p| p.username.as_str()).collect();
    payers.sort();
    assert_eq!(payers, vec!["alice_rides", "bobby_rides"]);

    let fetcher = RecordFetcher::new(ChainContext::new(Arc::new(ledger.clone())));
    assert_eq!(
        fetcher.get_balance(alice()).await,
        Some(TokenAmount::from_tokens(15))
    );
    assert_eq!(fetcher.get_user_payments(alice()).await.len(), 1);
}

#[tokio::test]
async fn payment_needs_funds_after_approval() {
    let ledger = seeded().await;
    let broke = Address::repeat_byte(0xee);
    let broke_tx = submitter_for(&ledger, broke);
    assert!(
        broke_tx
            .create_user(broke, &form("no_money_mo", "mo@example.com", "passenger"))
            .await
    );

    let before = ledger.submissions();
    assert!(!broke_tx.pay_for_ride(broke, U256::one(), U256::one()).await);
    // approve went through, payForRide reverted
    assert_eq!(ledger.submissions(), before + 2);
    assert_eq!(
        assert_ok!(ledger.allowance(broke)),
        TokenAmount::from_tokens(5)
    );
}

#[tokio::test]
async fn completion_moves_ride_to_history() {
    let ledger = seeded().await;
    let ride_id = U256::one();
    assert!(
        submitter_for(&ledger, alice())
            .pay_for_ride(alice(), ride_id, U256::from(2))
            .await
    );

    let views = reader(&ledger);
    assert!(views.ride_overview(ride_id).await.is_none());

    // only the ride's driver may complete it
    assert!(
        !submitter_for(&ledger, alice())
            .complete_ride(alice(), ride_id)
            .await
    );
    assert!(
        submitter_for(&ledger, driver())
            .complete_ride(driver(), ride_id)
            .await
    );

    let overview = views.ride_overview(ride_id).await.expect("ride is completed");
    assert_eq!(overview.total_earnings, TokenAmount::from_tokens(10));
    assert_eq!(overview.payments[0].username, "alice_rides");

    let dashboard = views.driver_dashboard(driver()).await.expect("registered");
    assert!(dashboard.rides.is_empty());

    let mut expansion = ExpansionState::default();
    expansion.toggle(2023, 11);
    let history = views.completed_rides(driver(), &expansion).await;
    assert_eq!(history.years.len(), 1);
    assert_eq!(history.years[0].year, 2023);
    assert_eq!(history.years[0].months[0].month_name, "November");
    assert_eq!(history.years[0].months[0].rides[0].id, ride_id);
    assert!(history.years[0].months[0].expanded);
    assert!(history.undated.is_empty());
}

#[tokio::test]
async fn home_routes_by_registration_and_role() {
    let ledger = seeded().await;
    assert!(
        submitter_for(&ledger, alice())
            .pay_for_ride(alice(), U256::one(), U256::one())
            .await
    );
    let views = reader(&ledger);

    match views.home(Address::repeat_byte(0x42)).await {
        HomeView::Unregistered { wallet_address } => {
            assert_eq!(wallet_address, Address::repeat_byte(0x42))
        }
        other => panic!("expected unregistered, got {:?}", other),
    }

    match views.home(driver()).await {
        HomeView::Driver(dashboard) => assert_eq!(dashboard.user.username, "tunde_drives"),
        other => panic!("expected driver, got {:?}", other),
    }

    match views.home(alice()).await {
        HomeView::Passenger(dashboard) => {
            assert_eq!(dashboard.open_rides.len(), 1);
            assert_eq!(dashboard.payments_by_date.len(), 1);
            let payment = &dashboard.payments_by_date[0].payments[0];
            assert_eq!(
                payment.ride.as_ref().map(|r| r.destination.as_str()),
                Some("Victoria Island")
            );
        }
        other => panic!("expected passenger, got {:?}", other),
    }
}

#[tokio::test]
async fn caller_must_be_the_connected_wallet() {
    let ledger = seeded().await;
    let before = ledger.submissions();

    // signer is the driver, caller claims to be Alice
    let mismatched = submitter_for(&ledger, driver());
    assert!(!mismatched.book_ride(alice(), U256::one()).await);

    let read_only = MutationSubmitter::new(ChainContext::new(Arc::new(ledger.clone())));
    assert!(!read_only.book_ride(alice(), U256::one()).await);

    let detached = MutationSubmitter::new(ChainContext::detached());
    assert!(!detached.book_ride(alice(), U256::one()).await);

    assert_eq!(ledger.submissions(), before);
}

#[tokio::test]
async fn unreachable_chain_degrades_views() {
    let ledger = seeded().await;
    ledger.fail_reads(true);
    let views = reader(&ledger);

    assert!(views.driver_dashboard(driver()).await.is_none());
    assert!(matches!(
        views.home(driver()).await,
        HomeView::Unregistered { .. }
    ));
    assert!(views
        .completed_rides(driver(), &ExpansionState::default())
        .await
        .years
        .is_empty());
}

#[tokio::test]
async fn dashboards_follow_the_registered_role() {
    let ledger = seeded().await;
    let views = reader(&ledger);

    assert!(views.driver_dashboard(alice()).await.is_none());
    assert!(views.passenger_dashboard(driver()).await.is_none());

    assert!(views.driver_dashboard(driver()).await.is_some());
    let dashboard = views.passenger_dashboard(alice()).await.expect("registered passenger");
    assert!(!dashboard.user.is_driver);
}
