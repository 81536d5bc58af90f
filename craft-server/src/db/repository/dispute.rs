//! Dispute Repository
//!
//! Disputes are created by the `OPEN_DISPUTE` order action; this repository
//! covers reading, the message thread and admin resolution.

use crate::db::Storage;
use crate::db::storage::{DISPUTES_TABLE, ORDERS_TABLE};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Dispute, DisputeMessage, DisputeOutcome, DisputeStatus, Order, OrderActionRequest,
};
use shared::order::{self, OrderAction, parties_of};
use shared::util::snowflake_id;

use super::order::after_transition;
use super::{RepoResult, found};

#[derive(Clone)]
pub struct DisputeRepository {
    storage: Storage,
}

impl DisputeRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Dispute visible to the order's parties and admins
    pub fn get_for(&self, id: i64, user_id: i64, is_admin: bool) -> RepoResult<Dispute> {
        let dispute: Dispute = found(
            self.storage.get(DISPUTES_TABLE, id)?,
            ErrorCode::DisputeNotFound,
        )?;
        let order: Order = found(
            self.storage.get(ORDERS_TABLE, dispute.order_id)?,
            ErrorCode::OrderNotFound,
        )?;
        if parties_of(&order, user_id, is_admin).is_empty() {
            return Err(AppError::permission_denied("Not a party to this dispute").into());
        }
        Ok(dispute)
    }

    /// Open disputes awaiting an admin, oldest first
    pub fn list_open(&self) -> RepoResult<Vec<Dispute>> {
        let mut disputes: Vec<Dispute> = self
            .storage
            .list::<Dispute>(DISPUTES_TABLE)?
            .into_iter()
            .filter(|d| d.status == DisputeStatus::Open)
            .collect();
        disputes.sort_by_key(|d| d.created_at);
        Ok(disputes)
    }

    pub fn add_message(
        &self,
        id: i64,
        sender_id: i64,
        is_admin: bool,
        text: &str,
        now: i64,
    ) -> RepoResult<Dispute> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::new(ErrorCode::DisputeMessageEmpty).into());
        }

        let txn = self.storage.begin_write()?;
        let mut dispute = found(
            self.storage.get_txn::<Dispute>(&txn, DISPUTES_TABLE, id)?,
            ErrorCode::DisputeNotFound,
        )?;
        let order = found(
            self.storage.get_txn::<Order>(&txn, ORDERS_TABLE, dispute.order_id)?,
            ErrorCode::OrderNotFound,
        )?;
        if parties_of(&order, sender_id, is_admin).is_empty() {
            return Err(AppError::permission_denied("Not a party to this dispute").into());
        }
        if dispute.status == DisputeStatus::Resolved {
            return Err(AppError::new(ErrorCode::DisputeAlreadyResolved).into());
        }

        dispute.messages.push(DisputeMessage {
            id: snowflake_id(),
            sender_id,
            text: text.to_string(),
            created_at: now,
        });
        self.storage.put(&txn, DISPUTES_TABLE, id, &dispute)?;
        txn.commit()?;
        Ok(dispute)
    }

    /// Settle a dispute and move its order to `RESOLVED_*`
    pub fn resolve(
        &self,
        id: i64,
        admin_id: i64,
        outcome: DisputeOutcome,
        now: i64,
    ) -> RepoResult<Dispute> {
        let txn = self.storage.begin_write()?;
        let dispute = found(
            self.storage.get_txn::<Dispute>(&txn, DISPUTES_TABLE, id)?,
            ErrorCode::DisputeNotFound,
        )?;
        if dispute.status == DisputeStatus::Resolved {
            return Err(AppError::new(ErrorCode::DisputeAlreadyResolved).into());
        }
        let mut order = found(
            self.storage.get_txn::<Order>(&txn, ORDERS_TABLE, dispute.order_id)?,
            ErrorCode::OrderNotFound,
        )?;

        let action = match outcome {
            DisputeOutcome::Buyer => OrderAction::ResolveForBuyer,
            DisputeOutcome::Seller => OrderAction::ResolveForSeller,
        };
        let request = OrderActionRequest::new(action);
        let parties = parties_of(&order, admin_id, true);
        order::apply(&mut order, &request, admin_id, &parties, now).map_err(AppError::from)?;
        after_transition(&self.storage, &txn, &mut order, &request, admin_id, now)?;
        self.storage.put(&txn, ORDERS_TABLE, order.id, &order)?;

        let resolved = found(
            self.storage.get_txn::<Dispute>(&txn, DISPUTES_TABLE, id)?,
            ErrorCode::DisputeNotFound,
        )?;
        txn.commit()?;

        tracing::info!(dispute_id = id, order_id = order.id, ?outcome, admin_id, "Dispute resolved");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{OrderRepository, RepoError};
    use crate::db::storage::PRODUCTS_TABLE;
    use shared::models::{DynamicAttributes, OrderCreate, PaymentMode, Product};
    use shared::order::OrderStatus;

    const SELLER: i64 = 10;
    const BUYER: i64 = 20;
    const ADMIN: i64 = 99;

    fn disputed_order(storage: &Storage) -> Order {
        let product = Product {
            id: 5,
            seller_id: SELLER,
            title: "Rolex Submariner".into(),
            description: String::new(),
            price: 9_000.0,
            currency: "USDT".into(),
            category: "Часы".into(),
            dynamic_attributes: DynamicAttributes::new(),
            images: vec![],
            is_auction: false,
            auction_ends_at: None,
            current_bid: None,
            bid_count: 0,
            requires_authentication: false,
            created_at: 0,
            updated_at: 0,
        };
        let txn = storage.begin_write().unwrap();
        storage.put(&txn, PRODUCTS_TABLE, product.id, &product).unwrap();
        txn.commit().unwrap();

        let orders = OrderRepository::new(storage.clone());
        let order = orders
            .create(
                BUYER,
                OrderCreate {
                    product_id: 5,
                    quantity: 1,
                    payment_mode: PaymentMode::Escrow,
                },
                1,
            )
            .unwrap();
        orders
            .apply_action(order.id, BUYER, false, &OrderActionRequest::new(OrderAction::ConfirmPayment), 2)
            .unwrap();
        let mut ship = OrderActionRequest::new(OrderAction::Ship);
        ship.tracking_number = Some("LP00123".into());
        orders.apply_action(order.id, SELLER, false, &ship, 3).unwrap();
        let mut open = OrderActionRequest::new(OrderAction::OpenDispute);
        open.reason = Some("Коробка пустая".into());
        orders.apply_action(order.id, BUYER, false, &open, 4).unwrap()
    }

    fn code(err: RepoError) -> ErrorCode {
        AppError::from(err).code
    }

    #[test]
    fn thread_and_resolution() {
        let storage = Storage::open_in_memory().unwrap();
        let order = disputed_order(&storage);
        let dispute_id = order.dispute_id.unwrap();
        let repo = DisputeRepository::new(storage.clone());

        assert_eq!(repo.list_open().unwrap().len(), 1);
        repo.add_message(dispute_id, SELLER, false, "Отправлял полную", 5).unwrap();
        let dispute = repo.add_message(dispute_id, ADMIN, true, "Пришлите фото", 6).unwrap();
        assert_eq!(dispute.messages.len(), 2);

        assert_eq!(
            code(repo.add_message(dispute_id, BUYER, false, "   ", 7).unwrap_err()),
            ErrorCode::DisputeMessageEmpty
        );
        assert_eq!(
            code(repo.add_message(dispute_id, 12345, false, "hi", 7).unwrap_err()),
            ErrorCode::PermissionDenied
        );

        let resolved = repo.resolve(dispute_id, ADMIN, DisputeOutcome::Seller, 8).unwrap();
        assert_eq!(resolved.status, DisputeStatus::Resolved);
        assert_eq!(resolved.resolution, Some(DisputeOutcome::Seller));
        assert_eq!(resolved.messages.len(), 2);

        let order = OrderRepository::new(storage).find_by_id(order.id).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::ResolvedSeller);
        assert!(repo.list_open().unwrap().is_empty());

        assert_eq!(
            code(repo.resolve(dispute_id, ADMIN, DisputeOutcome::Buyer, 9).unwrap_err()),
            ErrorCode::DisputeAlreadyResolved
        );
        assert_eq!(
            code(repo.add_message(dispute_id, BUYER, false, "ok", 9).unwrap_err()),
            ErrorCode::DisputeAlreadyResolved
        );
    }

    #[test]
    fn outsiders_cannot_read() {
        let storage = Storage::open_in_memory().unwrap();
        let order = disputed_order(&storage);
        let repo = DisputeRepository::new(storage);
        let id = order.dispute_id.unwrap();

        assert!(repo.get_for(id, BUYER, false).is_ok());
        assert!(repo.get_for(id, 777, true).is_ok());
        assert_eq!(code(repo.get_for(id, 777, false).unwrap_err()), ErrorCode::PermissionDenied);
        assert_eq!(code(repo.get_for(1, BUYER, false).unwrap_err()), ErrorCode::DisputeNotFound);
    }
}
