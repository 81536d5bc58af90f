//! Order Repository
//!
//! Checkout and lifecycle transitions. A transition loads the order, runs
//! the lifecycle guard, applies dispute side effects and stores the result
//! in one write transaction.

use redb::WriteTransaction;

use crate::db::Storage;
use crate::db::storage::{DISPUTES_TABLE, ORDERS_TABLE, PRODUCTS_TABLE};
use crate::security_log;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Dispute, DisputeOutcome, DisputeStatus, Order, OrderActionRequest, OrderCreate, Product,
};
use shared::money;
use shared::order::{self, OrderAction, OrderStatus, TransitionError, parties_of};
use shared::util::snowflake_id;

use super::{BidRepository, RepoResult, found};

#[derive(Clone)]
pub struct OrderRepository {
    storage: Storage,
}

impl OrderRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        Ok(self.storage.get(ORDERS_TABLE, id)?)
    }

    /// Order visible to a party of it or an admin
    pub fn get_for(&self, id: i64, user_id: i64, is_admin: bool) -> RepoResult<Order> {
        let order = found(self.find_by_id(id)?, ErrorCode::OrderNotFound)?;
        if parties_of(&order, user_id, is_admin).is_empty() {
            return Err(AppError::permission_denied("Not a party to this order").into());
        }
        Ok(order)
    }

    /// Orders the user bought, newest first
    pub fn purchases(&self, buyer_id: i64) -> RepoResult<Vec<Order>> {
        self.filtered(|o| o.buyer_id == buyer_id)
    }

    /// Orders on the user's listings, newest first
    pub fn sales(&self, seller_id: i64) -> RepoResult<Vec<Order>> {
        self.filtered(|o| o.seller_id == seller_id)
    }

    fn filtered(&self, keep: impl Fn(&Order) -> bool) -> RepoResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .list::<Order>(ORDERS_TABLE)?
            .into_iter()
            .filter(|o| keep(o))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Checkout: create a `PENDING` order for a product
    ///
    /// Auction lots can only be bought once the auction has ended, by the
    /// leading bidder, at the winning amount.
    pub fn create(&self, buyer_id: i64, payload: OrderCreate, now: i64) -> RepoResult<Order> {
        if !money::is_valid_quantity(payload.quantity) {
            return Err(AppError::with_message(
                ErrorCode::OrderInvalidQuantity,
                format!("quantity must be between 1 and {}", money::MAX_QUANTITY),
            )
            .into());
        }

        let txn = self.storage.begin_write()?;
        let product = found(
            self.storage.get_txn::<Product>(&txn, PRODUCTS_TABLE, payload.product_id)?,
            ErrorCode::ProductNotFound,
        )?;
        if product.seller_id == buyer_id {
            return Err(AppError::new(ErrorCode::OrderOwnProduct).into());
        }

        let unit_price = if product.is_auction {
            self.winning_price(&product, buyer_id, payload.quantity, now)?
        } else {
            product.price
        };

        let total = money::line_total(unit_price, payload.quantity)?;

        let order = Order {
            id: snowflake_id(),
            product_id: product.id,
            buyer_id,
            seller_id: product.seller_id,
            quantity: payload.quantity,
            total,
            currency: product.currency.clone(),
            payment_mode: payload.payment_mode,
            status: OrderStatus::Pending,
            tracking_number: None,
            authentication_report: None,
            nft_token_id: None,
            dispute_id: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.storage.put(&txn, ORDERS_TABLE, order.id, &order)?;
        txn.commit()?;

        tracing::info!(order_id = order.id, product_id = product.id, buyer_id, total = order.total, "Order created");
        Ok(order)
    }

    fn winning_price(
        &self,
        product: &Product,
        buyer_id: i64,
        quantity: u32,
        now: i64,
    ) -> RepoResult<f64> {
        if product.auction_ends_at.is_some_and(|ends| now < ends) {
            return Err(AppError::with_message(
                ErrorCode::AuctionNotActive,
                "Auction is still running",
            )
            .into());
        }
        if quantity != 1 {
            return Err(AppError::new(ErrorCode::OrderInvalidQuantity).into());
        }

        let leading = BidRepository::new(self.storage.clone()).leading(product.id)?;
        let Some(leading) = leading.filter(|bid| bid.bidder_id == buyer_id) else {
            return Err(AppError::permission_denied("Only the winning bidder can check out").into());
        };

        // One live order per auction lot
        let taken = self
            .storage
            .list::<Order>(ORDERS_TABLE)?
            .iter()
            .any(|o| o.product_id == product.id && o.status != OrderStatus::Cancelled);
        if taken {
            return Err(AppError::with_message(
                ErrorCode::AlreadyExists,
                "An order already exists for this lot",
            )
            .into());
        }
        Ok(leading.amount)
    }

    /// Apply a lifecycle action on behalf of a user
    pub fn apply_action(
        &self,
        id: i64,
        user_id: i64,
        is_admin: bool,
        request: &OrderActionRequest,
        now: i64,
    ) -> RepoResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = found(
            self.storage.get_txn::<Order>(&txn, ORDERS_TABLE, id)?,
            ErrorCode::OrderNotFound,
        )?;

        let parties = parties_of(&order, user_id, is_admin);
        if parties.is_empty() {
            security_log!("WARN", "order_access_denied", order_id = id, user_id = user_id);
            return Err(AppError::permission_denied("Not a party to this order").into());
        }

        let change = order::apply(&mut order, request, user_id, &parties, now).map_err(|e| {
            if matches!(e, TransitionError::Forbidden { .. }) {
                security_log!(
                    "WARN",
                    "order_transition_denied",
                    order_id = id,
                    user_id = user_id,
                    action = request.action.to_string()
                );
            }
            AppError::from(e)
        })?;

        after_transition(&self.storage, &txn, &mut order, request, user_id, now)?;
        self.storage.put(&txn, ORDERS_TABLE, id, &order)?;
        txn.commit()?;

        tracing::info!(
            order_id = id,
            from = %change.from,
            to = %change.to,
            action = %change.action,
            actor_id = user_id,
            "Order transition applied"
        );
        Ok(order)
    }

    /// Actions this user may take on the order right now
    pub fn available_actions(
        &self,
        id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> RepoResult<Vec<OrderAction>> {
        let order = self.get_for(id, user_id, is_admin)?;
        let parties = parties_of(&order, user_id, is_admin);
        Ok(order::allowed_actions_for(order.status, &parties))
    }
}

/// Dispute side effects of an applied transition (same transaction)
///
/// - `OPEN_DISPUTE` creates the dispute and links it to the order
/// - `RESOLVE_FOR_*` closes the linked dispute with the matching outcome
pub(crate) fn after_transition(
    storage: &Storage,
    txn: &WriteTransaction,
    order: &mut Order,
    request: &OrderActionRequest,
    actor_id: i64,
    now: i64,
) -> RepoResult<()> {
    match request.action {
        OrderAction::OpenDispute => {
            let dispute = Dispute {
                id: snowflake_id(),
                order_id: order.id,
                opened_by: actor_id,
                reason: request.reason.as_deref().unwrap_or_default().trim().to_string(),
                status: DisputeStatus::Open,
                messages: Vec::new(),
                resolution: None,
                created_at: now,
            };
            storage.put(txn, DISPUTES_TABLE, dispute.id, &dispute)?;
            order.dispute_id = Some(dispute.id);
            tracing::info!(order_id = order.id, dispute_id = dispute.id, "Dispute opened");
        }
        OrderAction::ResolveForBuyer | OrderAction::ResolveForSeller => {
            let outcome = if request.action == OrderAction::ResolveForBuyer {
                DisputeOutcome::Buyer
            } else {
                DisputeOutcome::Seller
            };
            if let Some(dispute_id) = order.dispute_id
                && let Some(mut dispute) = storage.get_txn::<Dispute>(txn, DISPUTES_TABLE, dispute_id)?
                && dispute.status == DisputeStatus::Open
            {
                dispute.status = DisputeStatus::Resolved;
                dispute.resolution = Some(outcome);
                storage.put(txn, DISPUTES_TABLE, dispute_id, &dispute)?;
            }
        }
        _ => {}
    }
    Ok(())
}
