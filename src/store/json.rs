//! JSON file store

use std::{
    collections::BTreeMap,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    cart::Quantities,
    prices::{PriceTable, price_from_decimal},
    products::{Catalog, ProductId},
    records::{FeedbackRecord, TransactionId, TransactionRecord, timestamp_now},
    store::{CatalogStore, FeedbackLog, StoreError, TransactionLog},
};

const PRODUCTS_FILE: &str = "products.json";
const PRICING_FILE: &str = "pricing.json";
const TRANSACTIONS_FILE: &str = "transactions.json";
const FEEDBACK_FILE: &str = "feedback.json";

/// Catalog written on first run: id, name, unit price.
const DEFAULT_CATALOG: [(u32, &str, f64); 10] = [
    (1, "potato", 2.0),
    (2, "tomato", 1.5),
    (3, "bread", 3.0),
    (4, "butter", 4.0),
    (5, "ketchup", 4.5),
    (6, "milk", 3.65),
    (7, "Jam", 5.8),
    (8, "CashewNuts", 13.8),
    (9, "Sweet-kalakand", 190.0),
    (10, "kiwi", 34.8),
];

/// Store backed by four JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open the store in `dir`, creating the directory and any missing files.
    ///
    /// Missing catalog and pricing files are seeded with the default catalog; missing
    /// logs start as empty arrays. Existing files are left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the directory or a seed file cannot be written.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { dir: dir.into() };

        fs::create_dir_all(&store.dir)?;

        store.seed(PRODUCTS_FILE, || {
            DEFAULT_CATALOG
                .iter()
                .map(|(id, name, _)| (*id, (*name).to_string()))
                .collect::<BTreeMap<_, _>>()
        })?;

        store.seed(PRICING_FILE, || {
            DEFAULT_CATALOG
                .iter()
                .map(|(id, _, price)| (*id, *price))
                .collect::<BTreeMap<_, _>>()
        })?;

        store.seed(TRANSACTIONS_FILE, Vec::<TransactionRecord>::new)?;
        store.seed(FEEDBACK_FILE, Vec::<FeedbackRecord>::new)?;

        Ok(store)
    }

    /// Directory holding the store files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn seed<T: Serialize>(
        &self,
        file: &str,
        contents: impl FnOnce() -> T,
    ) -> Result<(), StoreError> {
        if self.path(file).exists() {
            return Ok(());
        }

        info!(file, dir = %self.dir.display(), "seeding store file");

        self.write(file, &contents())
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, StoreError> {
        let contents = fs::read_to_string(self.path(file))?;

        Ok(serde_json::from_str(&contents)?)
    }

    /// Replace a file's contents. Writes a sibling temporary file and renames it into
    /// place, so readers never observe a partially written file.
    fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let temp = NamedTempFile::new_in(&self.dir)?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            let mut serializer = serde_json::Serializer::with_formatter(
                &mut writer,
                PrettyFormatter::with_indent(b"    "),
            );

            value.serialize(&mut serializer)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(self.path(file)).map_err(|err| err.error)?;

        Ok(())
    }

    fn append_record<T: Serialize + DeserializeOwned + Clone>(
        &self,
        file: &str,
        record: T,
    ) -> Result<T, StoreError> {
        let mut records: Vec<T> = self.read(file)?;
        records.push(record.clone());

        self.write(file, &records)?;

        Ok(record)
    }
}

fn parse_product_id(key: &str) -> Result<ProductId, StoreError> {
    key.parse()
        .map_err(|_err| StoreError::InvalidProductId(key.to_string()))
}

impl CatalogStore for JsonStore {
    fn load_products(&self) -> Result<Catalog, StoreError> {
        let raw: BTreeMap<String, String> = self.read(PRODUCTS_FILE)?;

        let catalog = raw
            .into_iter()
            .map(|(key, name)| Ok((parse_product_id(&key)?, name)))
            .collect::<Result<Catalog, StoreError>>()?;

        debug!(products = catalog.len(), "loaded catalog");

        Ok(catalog)
    }

    fn load_prices(&self, currency: &'static Currency) -> Result<PriceTable, StoreError> {
        let raw: BTreeMap<String, Decimal> = self.read(PRICING_FILE)?;
        let mut prices = PriceTable::new(currency);

        for (key, amount) in raw {
            let product = parse_product_id(&key)?;
            let price = price_from_decimal(amount, currency).ok_or(StoreError::InvalidPrice {
                product: key,
                price: amount,
            })?;

            prices.insert(product, price.to_minor_units());
        }

        debug!(prices = prices.len(), currency = currency.iso_alpha_code, "loaded prices");

        Ok(prices)
    }
}

impl TransactionLog for JsonStore {
    fn append(
        &self,
        transaction_id: TransactionId,
        items: &Quantities,
        total: Decimal,
    ) -> Result<TransactionRecord, StoreError> {
        let record = self.append_record(
            TRANSACTIONS_FILE,
            TransactionRecord {
                transaction_id,
                items: items.clone(),
                total,
                timestamp: timestamp_now(),
            },
        )?;

        info!(%transaction_id, %total, items = items.len(), "recorded transaction");

        Ok(record)
    }

    fn transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        self.read(TRANSACTIONS_FILE)
    }
}

impl FeedbackLog for JsonStore {
    fn append(
        &self,
        transaction_id: TransactionId,
        feedback: &str,
    ) -> Result<FeedbackRecord, StoreError> {
        let record = self.append_record(
            FEEDBACK_FILE,
            FeedbackRecord {
                transaction_id,
                feedback: feedback.to_string(),
                timestamp: timestamp_now(),
            },
        )?;

        info!(%transaction_id, "recorded feedback");

        Ok(record)
    }

    fn feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.read(FEEDBACK_FILE)
    }
}
