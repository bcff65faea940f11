use cashless_taxi::{
    models::TokenAmount,
    services::{ChainContext, EthereumLedger, RecordFetcher, TaxiLedger},
};
use ethers::{
    abi::{self, Token},
    types::{Address, U256},
    utils::hex,
};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

fn rpc_result(tokens: &[Token]) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": format!("0x{}", hex::encode(abi::encode(tokens))),
    })
    .to_string()
}

fn eth_call() -> Matcher {
    Matcher::PartialJsonString(r#"{"method":"eth_call"}"#.to_string())
}

#[tokio::test]
async fn decodes_user_existence() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(eth_call())
        .with_header("content-type", "application/json")
        .with_body(rpc_result(&[Token::Bool(true)]))
        .create_async()
        .await;

    let ledger = EthereumLedger::new(&server.url(), None, contract()).unwrap();
    assert!(ledger.signer_address().is_none());
    assert!(ledger
        .check_if_user_exists(Address::repeat_byte(0x01))
        .await
        .unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn decodes_ride_structs() {
    let mut server = Server::new_async().await;
    let fare = TokenAmount::from_tokens(5);
    let ride = Token::Tuple(vec![
        Token::Uint(U256::from(7)),
        Token::Address(Address::repeat_byte(0xd1)),
        Token::String("Yaba".to_string()),
        Token::String("Tunde Bakare".to_string()),
        Token::String("LAG-442-KJ".to_string()),
        Token::Uint(fare.wei()),
        Token::Uint(U256::from(4)),
        Token::Uint(fare.wei() * 4),
        Token::Uint(U256::from(1_700_000_000u64)),
        Token::Uint(U256::from(1_700_000_600u64)),
        Token::Bool(true),
        Token::Bool(false),
        Token::Bool(false),
        Token::Bool(false),
    ]);
    server
        .mock("POST", "/")
        .match_body(eth_call())
        .with_header("content-type", "application/json")
        .with_body(rpc_result(&[Token::Array(vec![ride])]))
        .create_async()
        .await;

    let ledger = EthereumLedger::new(&server.url(), None, contract()).unwrap();
    let rides = ledger.get_all_rides().await.unwrap();

    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].id, U256::from(7));
    assert_eq!(rides[0].destination, "Yaba");
    assert_eq!(rides[0].fare_in_ethers, fare);
    assert_eq!(rides[0].total_fare, TokenAmount::from_tokens(20));
    assert!(rides[0].is_booked);
    assert!(!rides[0].is_unset());
}

#[tokio::test]
async fn falls_back_when_primary_rpc_fails() {
    let mut primary = Server::new_async().await;
    primary
        .mock("POST", "/")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let mut fallback = Server::new_async().await;
    let served = fallback
        .mock("POST", "/")
        .match_body(eth_call())
        .with_header("content-type", "application/json")
        .with_body(rpc_result(&[Token::Uint(TokenAmount::from_tokens(3).wei())]))
        .create_async()
        .await;

    let ledger = EthereumLedger::new(&primary.url(), Some(&fallback.url()), contract()).unwrap();
    let fetcher = RecordFetcher::new(ChainContext::new(Arc::new(ledger)));

    assert_eq!(
        fetcher.get_balance(Address::repeat_byte(0xa1)).await,
        Some(TokenAmount::from_tokens(3))
    );
    served.assert_async().await;
}

#[tokio::test]
async fn writes_without_signer_are_refused() {
    let server = Server::new_async().await;
    let ledger = EthereumLedger::new(&server.url(), None, contract()).unwrap();
    assert!(ledger.book_ride(U256::one()).await.is_err());
}
