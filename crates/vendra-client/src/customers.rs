//! # Customer Endpoints
//!
//! Customer lookup and balances. The loyalty and eWallet balances returned
//! here feed the client-side caps; the server re-validates on submission.

use vendra_core::validation::validate_barcode;
use vendra_core::Customer;

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;

/// Customer endpoints.
#[derive(Debug, Clone)]
pub struct CustomersApi {
    http: HttpClient,
}

impl CustomersApi {
    pub(crate) fn new(http: HttpClient) -> Self {
        CustomersApi { http }
    }

    /// Lists customers.
    pub async fn list(&self) -> ClientResult<Vec<Customer>> {
        self.http.get("/customers").await
    }

    /// Fetches one customer by id (fresh balances).
    pub async fn by_id(&self, id: &str) -> ClientResult<Customer> {
        self.http.get(&format!("/customers/{}", id)).await
    }

    /// Looks up a customer by scanned membership barcode.
    pub async fn by_barcode(&self, code: &str) -> ClientResult<Customer> {
        let code =
            validate_barcode(code).map_err(|e| ClientError::Validation(e.to_string()))?;
        self.http
            .get(&format!("/customers/barcode/{}", code))
            .await
    }
}
