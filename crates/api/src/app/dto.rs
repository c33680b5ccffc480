//! Request/response DTOs and JSON mapping helpers.
//!
//! Monetary amounts cross the wire as decimal strings (`"100.50"`); birth
//! dates keep the upstream `dd/mm/yyyy` format.

use serde::{Deserialize, Serialize};

use ledgerbank_auth::Principal;
use ledgerbank_banking::{Account, Client, Transaction};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub username: String,
    pub display_name: Option<String>,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    pub tax_id: String,
    pub name: String,
    pub birth_date: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub tax_id: String,
    pub name: String,
    pub birth_date: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    pub tax_id: String,
    pub number: i64,
    #[serde(default)]
    pub initial_balance: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub number: i64,
    pub balance: String,
    pub client_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub tax_id: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub amount: String,
    pub posted_at: String,
    pub sequence: u64,
}

pub fn principal_to_response(principal: &Principal) -> PrincipalResponse {
    PrincipalResponse {
        username: principal.username.clone(),
        display_name: principal.display_name.clone(),
        active: principal.active,
    }
}

pub fn client_to_response(client: &Client) -> ClientResponse {
    ClientResponse {
        id: client.id.to_string(),
        tax_id: client.tax_id.to_string(),
        name: client.name.clone(),
        birth_date: client.birth_date.format("%d/%m/%Y").to_string(),
        address: client.address.clone(),
    }
}

pub fn account_to_response(account: &Account) -> AccountResponse {
    AccountResponse {
        id: account.id.to_string(),
        number: account.number.value(),
        balance: account.balance.to_string(),
        client_id: account.client_id.to_string(),
    }
}

pub fn transaction_to_response(transaction: &Transaction) -> TransactionResponse {
    TransactionResponse {
        id: transaction.id.to_string(),
        account_id: transaction.account_id.to_string(),
        kind: transaction.kind.to_string(),
        amount: transaction.amount.to_string(),
        posted_at: transaction.posted_at.to_rfc3339(),
        sequence: transaction.sequence,
    }
}
