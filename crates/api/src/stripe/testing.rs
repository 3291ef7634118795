//! In-memory [`PaymentsApi`] fake for service tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::{LoginLink, PaymentIntent, PaymentsApi, StripeError, Transfer, TransferRequest};

#[derive(Default)]
struct State {
    outage: bool,
    failing_destinations: HashSet<String>,
    intents: Vec<(i64, String, Vec<(String, String)>)>,
    transfers: Vec<TransferRequest>,
    login_links: Vec<String>,
    next_id: u64,
}

/// Configurable payments fake. Clones share state.
#[derive(Clone, Default)]
pub struct FakePayments {
    state: Arc<Mutex<State>>,
}

impl FakePayments {
    /// Every call answers `Unavailable`.
    #[must_use]
    pub fn with_outage(self) -> Self {
        self.state.lock().unwrap().outage = true;
        self
    }

    /// Transfers to this connected account fail; others succeed.
    #[must_use]
    pub fn with_failing_destination(self, account: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_destinations
            .insert(account.to_string());
        self
    }

    /// Payment intents created, as `(amount, currency, metadata)`.
    #[must_use]
    pub fn intents(&self) -> Vec<(i64, String, Vec<(String, String)>)> {
        self.state.lock().unwrap().intents.clone()
    }

    /// Transfer requests attempted, in submission order.
    #[must_use]
    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.state.lock().unwrap().transfers.clone()
    }

    /// Accounts for which a login link was minted.
    #[must_use]
    pub fn login_links(&self) -> Vec<String> {
        self.state.lock().unwrap().login_links.clone()
    }

    fn check_outage(&self) -> Result<(), StripeError> {
        if self.state.lock().unwrap().outage {
            return Err(StripeError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

impl PaymentsApi for FakePayments {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: &[(String, String)],
    ) -> Result<PaymentIntent, StripeError> {
        self.check_outage()?;
        let mut state = self.state.lock().unwrap();
        state
            .intents
            .push((amount, currency.to_string(), metadata.to_vec()));
        state.next_id += 1;
        let id = format!("pi_test_{}", state.next_id);
        Ok(PaymentIntent {
            client_secret: format!("{id}_secret"),
            id,
        })
    }

    async fn create_transfer(&self, request: &TransferRequest) -> Result<Transfer, StripeError> {
        self.check_outage()?;
        let mut state = self.state.lock().unwrap();
        state.transfers.push(request.clone());
        if state.failing_destinations.contains(&request.destination) {
            return Err(StripeError::Rejected {
                status: 400,
                message: format!("no such destination: {}", request.destination),
            });
        }
        state.next_id += 1;
        Ok(Transfer {
            id: format!("tr_test_{}", state.next_id),
            amount: request.amount,
            destination: request.destination.clone(),
        })
    }

    async fn create_login_link(&self, account: &str) -> Result<LoginLink, StripeError> {
        self.check_outage()?;
        let mut state = self.state.lock().unwrap();
        state.login_links.push(account.to_string());
        Ok(LoginLink {
            url: format!("https://connect.stripe.com/express/{account}"),
        })
    }
}
