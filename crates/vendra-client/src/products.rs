//! # Product Endpoints

use vendra_core::validation::validate_barcode;
use vendra_core::Product;

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Product catalog endpoints.
#[derive(Debug, Clone)]
pub struct ProductsApi {
    http: HttpClient,
}

impl ProductsApi {
    pub(crate) fn new(http: HttpClient) -> Self {
        ProductsApi { http }
    }

    /// Lists the catalog.
    pub async fn list(&self) -> ClientResult<Vec<Product>> {
        self.http.get("/products").await
    }

    /// Looks up one product by scanned barcode.
    ///
    /// The barcode is validated locally first, so a bad scan never makes
    /// a network round-trip.
    pub async fn by_barcode(&self, code: &str) -> ClientResult<Product> {
        let code = validate_barcode(code)
            .map_err(|e| crate::error::ClientError::Validation(e.to_string()))?;
        self.http
            .get(&format!("/products/barcode/{}", code))
            .await
    }
}
