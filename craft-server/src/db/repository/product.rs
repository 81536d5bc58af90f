//! Product Repository
//!
//! Listings are normalized against their category's resolved fields on
//! every create and on updates that touch the category or attributes.

use serde_json::Value;

use crate::db::Storage;
use crate::db::storage::PRODUCTS_TABLE;
use shared::catalog::{normalize, validate_required};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DynamicAttributes, Product, ProductCreate, ProductQuery, ProductUpdate, RawAttributes,
};
use shared::money;
use shared::util::snowflake_id;

use super::{CategoryRepository, RepoResult, ensure_owner, found};

#[derive(Clone)]
pub struct ProductRepository {
    storage: Storage,
}

impl ProductRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<Product>> {
        Ok(self.storage.get(PRODUCTS_TABLE, id)?)
    }

    pub fn get(&self, id: i64) -> RepoResult<Product> {
        found(self.find_by_id(id)?, ErrorCode::ProductNotFound)
    }

    /// Listings matching the filter, newest first
    pub fn list(&self, query: &ProductQuery) -> RepoResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .storage
            .list::<Product>(PRODUCTS_TABLE)?
            .into_iter()
            .filter(|p| query.category.as_ref().is_none_or(|c| &p.category == c))
            .filter(|p| query.seller_id.is_none_or(|s| p.seller_id == s))
            .filter(|p| !query.auctions_only.unwrap_or(false) || p.is_auction)
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    pub fn create(&self, seller_id: i64, payload: ProductCreate, now: i64) -> RepoResult<Product> {
        let title = payload.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title must not be empty").into());
        }
        check_price(payload.price)?;
        let auction_ends_at = check_auction(payload.is_auction, payload.auction_ends_at, now)?;
        let dynamic_attributes =
            self.normalize_attributes(&payload.category, &payload.dynamic_attributes)?;

        let product = Product {
            id: snowflake_id(),
            seller_id,
            title: title.to_string(),
            description: payload.description,
            price: money::to_f64(money::to_decimal(payload.price)),
            currency: normalize_currency(&payload.currency),
            category: payload.category,
            dynamic_attributes,
            images: payload.images,
            is_auction: payload.is_auction,
            auction_ends_at,
            current_bid: None,
            bid_count: 0,
            requires_authentication: payload.requires_authentication,
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        self.storage.put(&txn, PRODUCTS_TABLE, product.id, &product)?;
        txn.commit()?;

        tracing::info!(product_id = product.id, seller_id, category = %product.category, "Product created");
        Ok(product)
    }

    pub fn update(
        &self,
        id: i64,
        user_id: i64,
        is_admin: bool,
        update: ProductUpdate,
        now: i64,
    ) -> RepoResult<Product> {
        let txn = self.storage.begin_write()?;
        let mut product = found(
            self.storage.get_txn::<Product>(&txn, PRODUCTS_TABLE, id)?,
            ErrorCode::ProductNotFound,
        )?;
        ensure_owner(product.seller_id, user_id, is_admin)?;

        if let Some(title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError::validation("title must not be empty").into());
            }
            product.title = title.to_string();
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            check_price(price)?;
            if product.is_auction && product.bid_count > 0 {
                return Err(AppError::validation("price cannot change once bidding has started").into());
            }
            product.price = money::to_f64(money::to_decimal(price));
        }
        if let Some(images) = update.images {
            product.images = images;
        }
        if let Some(flag) = update.requires_authentication {
            product.requires_authentication = flag;
        }
        if update.auction_ends_at.is_some() {
            product.auction_ends_at = check_auction(product.is_auction, update.auction_ends_at, now)?;
        }

        let category_changed = update
            .category
            .as_ref()
            .is_some_and(|c| *c != product.category);
        if category_changed || update.dynamic_attributes.is_some() {
            if let Some(category) = update.category {
                product.category = category;
            }
            let raw = match update.dynamic_attributes {
                Some(raw) => raw,
                None => to_raw(&product.dynamic_attributes),
            };
            product.dynamic_attributes = self.normalize_attributes(&product.category, &raw)?;
        }
        product.updated_at = now;

        self.storage.put(&txn, PRODUCTS_TABLE, id, &product)?;
        txn.commit()?;
        Ok(product)
    }

    /// Remove a listing together with its bids
    pub fn delete(&self, id: i64, user_id: i64, is_admin: bool) -> RepoResult<()> {
        let txn = self.storage.begin_write()?;
        let product = found(
            self.storage.get_txn::<Product>(&txn, PRODUCTS_TABLE, id)?,
            ErrorCode::ProductNotFound,
        )?;
        ensure_owner(product.seller_id, user_id, is_admin)?;

        self.storage.remove(&txn, PRODUCTS_TABLE, id)?;
        let bids = self.storage.remove_bids(&txn, id)?;
        txn.commit()?;

        tracing::info!(product_id = id, bids, "Product deleted");
        Ok(())
    }

    fn normalize_attributes(
        &self,
        category: &str,
        raw: &RawAttributes,
    ) -> RepoResult<DynamicAttributes> {
        let fields = CategoryRepository::new(self.storage.clone()).fields_for_listing(category)?;
        let attrs = normalize(raw, &fields);

        let issues = validate_required(&fields, &attrs);
        if !issues.is_empty() {
            return Err(AppError::new(ErrorCode::ProductAttributesInvalid)
                .with_detail("issues", serde_json::to_value(&issues).unwrap_or_default())
                .into());
        }
        Ok(attrs)
    }
}

fn check_price(price: f64) -> RepoResult<()> {
    if money::is_valid_amount(price) {
        return Ok(());
    }
    Err(AppError::new(ErrorCode::ProductInvalidPrice).into())
}

fn check_auction(is_auction: bool, ends_at: Option<i64>, now: i64) -> RepoResult<Option<i64>> {
    if !is_auction {
        return Ok(None);
    }
    match ends_at {
        Some(ends) if ends > now => Ok(Some(ends)),
        _ => Err(AppError::validation("auctionEndsAt must be in the future").into()),
    }
}

fn normalize_currency(currency: &str) -> String {
    let currency = currency.trim();
    if currency.is_empty() {
        return "USDT".to_string();
    }
    currency.to_uppercase()
}

fn to_raw(attrs: &DynamicAttributes) -> RawAttributes {
    match serde_json::to_value(attrs) {
        Ok(Value::Object(map)) => map,
        _ => RawAttributes::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{AttributeValue, CategorySchema};

    fn setup() -> (Storage, ProductRepository) {
        let storage = Storage::open_in_memory().unwrap();
        let tree: Vec<CategorySchema> = serde_json::from_str(
            r#"[{"name":"Электроника","fields":[
                    {"name":"brand","label":"Бренд","type":"text","required":true},
                    {"name":"condition","label":"Состояние","type":"select","options":["Новый","Б/у"]}],
                 "subcategories":[{"name":"Смартфоны","fields":[
                    {"name":"screen_size","label":"Диагональ","type":"number"}]}]}]"#,
        )
        .unwrap();
        CategoryRepository::new(storage.clone()).replace(tree).unwrap();
        (storage.clone(), ProductRepository::new(storage))
    }

    fn phone(attrs: serde_json::Value) -> ProductCreate {
        serde_json::from_value(serde_json::json!({
            "title": "iPhone 15",
            "price": 899.999,
            "currency": "usdt",
            "category": "Смартфоны",
            "dynamicAttributes": attrs,
        }))
        .unwrap()
    }

    #[test]
    fn create_normalizes_attributes() {
        let (_, repo) = setup();
        let product = repo
            .create(
                1,
                phone(serde_json::json!({"Бренд": "Apple", "screen_size": "6.1", "junk": 1})),
                100,
            )
            .unwrap();

        assert_eq!(product.price, 900.0);
        assert_eq!(product.currency, "USDT");
        assert_eq!(product.dynamic_attributes.len(), 2);
        assert_eq!(
            product.dynamic_attributes["screen_size"],
            AttributeValue::Number(6.1)
        );
        assert_eq!(repo.get(product.id).unwrap(), product);
    }

    #[test]
    fn create_rejects_missing_required_and_bad_option() {
        let (_, repo) = setup();
        let err: AppError = repo
            .create(1, phone(serde_json::json!({"condition": "Сломан"})), 100)
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::ProductAttributesInvalid);
        let issues = &err.details.unwrap()["issues"];
        assert_eq!(issues.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn create_rejects_unknown_category_and_price() {
        let (_, repo) = setup();
        let mut payload = phone(serde_json::json!({"brand": "Apple"}));
        payload.category = "Мебель".into();
        let err: AppError = repo.create(1, payload, 100).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::CategoryNotFound);

        let mut payload = phone(serde_json::json!({"brand": "Apple"}));
        payload.price = 0.0;
        let err: AppError = repo.create(1, payload, 100).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
    }

    #[test]
    fn update_checks_owner_and_renormalizes() {
        let (_, repo) = setup();
        let product = repo
            .create(1, phone(serde_json::json!({"brand": "Apple"})), 100)
            .unwrap();

        let err: AppError = repo
            .update(product.id, 2, false, ProductUpdate::default(), 200)
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let mut raw = RawAttributes::new();
        raw.insert("brand".into(), "Samsung".into());
        raw.insert("Диагональ".into(), 6.8.into());
        let updated = repo
            .update(
                product.id,
                1,
                false,
                ProductUpdate {
                    dynamic_attributes: Some(raw),
                    ..Default::default()
                },
                200,
            )
            .unwrap();
        assert_eq!(
            updated.dynamic_attributes["brand"],
            AttributeValue::Text("Samsung".into())
        );
        assert_eq!(updated.updated_at, 200);

        // Moving to the parent category drops fields it does not declare
        let moved = repo
            .update(
                product.id,
                1,
                true,
                ProductUpdate {
                    category: Some("Электроника".into()),
                    ..Default::default()
                },
                300,
            )
            .unwrap();
        assert!(!moved.dynamic_attributes.contains_key("screen_size"));
    }

    #[test]
    fn price_update_waits_for_pending_bid() {
        let (storage, repo) = setup();
        let mut lot = phone(serde_json::json!({"brand": "Apple"}));
        lot.is_auction = true;
        lot.auction_ends_at = Some(10_000);
        let product = repo.create(1, lot, 100).unwrap();

        // A bid is being written while the seller edits the price
        let txn = storage.begin_write().unwrap();
        let mut bidded = storage
            .get_txn::<Product>(&txn, PRODUCTS_TABLE, product.id)
            .unwrap()
            .unwrap();
        bidded.current_bid = Some(950.0);
        bidded.bid_count = 1;
        storage.put(&txn, PRODUCTS_TABLE, product.id, &bidded).unwrap();

        let editor = {
            let repo = repo.clone();
            std::thread::spawn(move || {
                repo.update(
                    product.id,
                    1,
                    false,
                    ProductUpdate {
                        price: Some(10.0),
                        title: Some("iPhone 15 Pro".into()),
                        ..Default::default()
                    },
                    200,
                )
            })
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        txn.commit().unwrap();

        let err: AppError = editor.join().unwrap().unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let stored = repo.get(product.id).unwrap();
        assert_eq!(stored.price, 900.0);
        assert_eq!(stored.title, "iPhone 15");
        assert_eq!(stored.bid_count, 1);
    }

    #[test]
    fn create_rejects_out_of_range_price() {
        let (_, repo) = setup();
        for price in [1e30, money::MAX_PRICE * 2.0, f64::INFINITY] {
            let mut payload = phone(serde_json::json!({"brand": "Apple"}));
            payload.price = price;
            let err: AppError = repo.create(1, payload, 100).unwrap_err().into();
            assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
        }
        let mut payload = phone(serde_json::json!({"brand": "Apple"}));
        payload.price = money::MAX_PRICE;
        assert_eq!(repo.create(1, payload, 100).unwrap().price, money::MAX_PRICE);
    }

    #[test]
    fn list_filters_and_delete() {
        let (_, repo) = setup();
        let a = repo
            .create(1, phone(serde_json::json!({"brand": "Apple"})), 100)
            .unwrap();
        let mut lot = phone(serde_json::json!({"brand": "Nokia"}));
        lot.is_auction = true;
        lot.auction_ends_at = Some(10_000);
        let b = repo.create(2, lot, 200).unwrap();

        let all = repo.list(&ProductQuery::default()).unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let auctions = repo
            .list(&ProductQuery {
                auctions_only: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(auctions.len(), 1);

        let by_seller = repo
            .list(&ProductQuery {
                seller_id: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_seller[0].id, a.id);

        assert!(repo.delete(a.id, 2, false).is_err());
        repo.delete(a.id, 1, false).unwrap();
        assert!(repo.find_by_id(a.id).unwrap().is_none());
    }
}
