use ethers::prelude::*;

// Taxi contract ABI. Struct layouts for Ride, Payment and TaxiUser are fixed by
// the deployed contract and must match field-for-field.
abigen!(TaxiContract, "./abi/TaxiContract.json");
