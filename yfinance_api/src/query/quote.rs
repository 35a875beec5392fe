//! Query builder for the `/v7/finance/quote` snapshot endpoint.

use url::Url;

use super::Query;

#[derive(Clone, Debug, Default)]
pub struct QuoteQuery {
    pub symbols: Vec<String>,
}

impl Query for QuoteQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("symbols", &self.symbols.join(","));
        url
    }
}

impl QuoteQuery {
    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbols.push(symbol.to_string());
        self
    }
}
