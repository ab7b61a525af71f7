//! Stock listings from the catalog and ISO 4217 currencies.

use serde::Serialize;

use crate::catalog::parse_columns;
use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::randomly::Randomly;
use crate::select::Variants;

const STOCKS: &str = "finance/stocks";

/// One catalog row: `SYMBOL|Name|MarketCap|Price`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub symbol: String,
    pub name: String,
    pub market_cap: i64,
    pub price: f64,
}

impl StockEntry {
    pub const COLUMN_COUNT: usize = 4;

    pub fn parse(raw: &str) -> Result<Self> {
        let columns = parse_columns(raw, Self::COLUMN_COUNT)?;
        let market_cap = columns[2]
            .trim()
            .parse()
            .map_err(|err| Error::invalid(format!("invalid market cap in {raw:?}: {err}")))?;
        let price = columns[3]
            .trim()
            .parse()
            .map_err(|err| Error::invalid(format!("invalid price in {raw:?}: {err}")))?;
        Ok(Self {
            symbol: columns[0].trim().to_string(),
            name: columns[1].trim().to_string(),
            market_cap,
            price,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
}

const fn currency(code: &'static str, symbol: &'static str) -> Currency {
    Currency { code, symbol }
}

/// Widely traded currencies with their customary symbols.
pub const CURRENCIES: &[Currency] = &[
    currency("USD", "$"),
    currency("EUR", "€"),
    currency("GBP", "£"),
    currency("JPY", "¥"),
    currency("CNY", "CN¥"),
    currency("CHF", "CHF"),
    currency("CAD", "CA$"),
    currency("AUD", "A$"),
    currency("NZD", "NZ$"),
    currency("HKD", "HK$"),
    currency("SGD", "S$"),
    currency("SEK", "kr"),
    currency("NOK", "NOK"),
    currency("DKK", "DKK"),
    currency("PLN", "zł"),
    currency("CZK", "Kč"),
    currency("INR", "₹"),
    currency("KRW", "₩"),
    currency("BRL", "R$"),
    currency("MXN", "MX$"),
    currency("ZAR", "R"),
    currency("TRY", "₺"),
];

impl Variants for Currency {
    const ALL: &'static [Self] = CURRENCIES;
}

pub struct FinanceRandomly<'r> {
    randomly: &'r mut Randomly,
}

impl<'r> FinanceRandomly<'r> {
    pub fn new(randomly: &'r mut Randomly) -> Self {
        Self { randomly }
    }

    pub fn stock(&mut self) -> Result<StockEntry> {
        let locale = self.randomly.locale().clone();
        self.stock_in(&locale)
    }

    /// Listing from the locale's stocks catalog (`en`, `de-DE` bundled).
    pub fn stock_in(&mut self, locale: &Locale) -> Result<StockEntry> {
        let rows = self.randomly.catalog().load(STOCKS, locale)?;
        StockEntry::parse(self.randomly.element_of(&rows)?)
    }

    pub fn stock_symbol(&mut self) -> Result<String> {
        Ok(self.stock()?.symbol)
    }

    pub fn stock_symbol_in(&mut self, locale: &Locale) -> Result<String> {
        Ok(self.stock_in(locale)?.symbol)
    }

    pub fn currency(&mut self) -> Result<Currency> {
        self.randomly.enum_of()
    }

    pub fn currency_excluding(&mut self, excluding: &[Currency]) -> Result<Currency> {
        self.randomly.enum_of_excluding(excluding)
    }

    pub fn currency_code(&mut self) -> Result<&'static str> {
        Ok(self.currency()?.code)
    }

    pub fn currency_code_excluding(&mut self, excluding: &[&str]) -> Result<&'static str> {
        self.pick(|c| c.code, excluding)
    }

    pub fn currency_symbol(&mut self) -> Result<&'static str> {
        Ok(self.currency()?.symbol)
    }

    /// Every currency whose symbol is listed is skipped.
    pub fn currency_symbol_excluding(&mut self, excluding: &[&str]) -> Result<&'static str> {
        self.pick(|c| c.symbol, excluding)
    }

    fn pick(
        &mut self,
        field: fn(&Currency) -> &'static str,
        excluding: &[&str],
    ) -> Result<&'static str> {
        let remaining: Vec<&'static str> = CURRENCIES
            .iter()
            .map(field)
            .filter(|value| !excluding.contains(value))
            .collect();
        self.randomly.element_of(&remaining).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::randomly::SeedContext;
    use std::collections::HashSet;

    fn randomly(scope: &str, locale: &str) -> Randomly {
        SeedContext::new(Settings {
            seed: Some(314),
            locale: Some(locale.parse().unwrap()),
            ..Settings::default()
        })
        .scoped(scope)
        .unwrap()
    }

    #[test]
    fn parses_stock_rows() {
        let entry = StockEntry::parse("SAP| SAP SE |250000000000| 210.5").unwrap();
        assert_eq!(entry.symbol, "SAP");
        assert_eq!(entry.name, "SAP SE");
        assert_eq!(entry.market_cap, 250_000_000_000);
        assert_eq!(entry.price, 210.5);
        assert!(StockEntry::parse("SAP|SAP SE|lots|1.0").is_err());
        assert!(StockEntry::parse("SAP|SAP SE").is_err());
    }

    #[test]
    fn stocks_follow_locale() {
        let catalog = crate::catalog::Catalog::bundled();
        let english = catalog.load(STOCKS, &Locale::english()).unwrap();
        let german = catalog.load(STOCKS, &"de-DE".parse().unwrap()).unwrap();
        let symbols = |rows: &[String]| -> HashSet<String> {
            rows.iter()
                .map(|row| StockEntry::parse(row).unwrap().symbol)
                .collect()
        };
        let (en_symbols, de_symbols) = (symbols(&english[..]), symbols(&german[..]));

        let mut en = randomly("finance#stocks", "en-US");
        let mut de = randomly("finance#stocks", "de-DE");
        for _ in 0..50 {
            assert!(en_symbols.contains(&en.finance().stock_symbol().unwrap()));
            let stock = de.finance().stock().unwrap();
            assert!(de_symbols.contains(&stock.symbol));
            assert!(stock.price > 0.0 && stock.market_cap > 0);
        }
        assert!(de.finance().stock_in(&"de-AT".parse().unwrap()).is_err());
    }

    #[test]
    fn currencies_honour_exclusions() {
        let mut r = randomly("finance#currency", "en");
        let mut finance = r.finance();
        let mut codes = HashSet::new();
        for _ in 0..2_000 {
            let code = finance.currency_code_excluding(&["USD", "EUR"]).unwrap();
            assert!(code != "USD" && code != "EUR");
            codes.insert(code);

            let symbol = finance.currency_symbol_excluding(&["$", "€"]).unwrap();
            assert!(symbol != "$" && symbol != "€");

            let currency = finance.currency_excluding(&CURRENCIES[1..]).unwrap();
            assert_eq!(currency.code, "USD");
        }
        assert_eq!(codes.len(), CURRENCIES.len() - 2);

        let all_codes: Vec<&str> = CURRENCIES.iter().map(|c| c.code).collect();
        assert!(finance.currency_code_excluding(&all_codes).is_err());
    }

    #[test]
    fn currency_table_is_consistent() {
        let codes: HashSet<&str> = CURRENCIES.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), CURRENCIES.len());
        assert!(CURRENCIES
            .iter()
            .all(|c| c.code.len() == 3 && c.code.chars().all(|ch| ch.is_ascii_uppercase())));
        let mut r = randomly("finance#plain", "en");
        let currency = r.finance().currency().unwrap();
        assert!(CURRENCIES.contains(&currency));
        assert!(!r.finance().currency_symbol().unwrap().is_empty());
    }
}
