//! Order lifecycle state machine
//!
//! Every status change goes through [`TRANSITIONS`], keyed by
//! `(current status, action)`. A pair that is not in the table is rejected,
//! and each row names the parties allowed to trigger it.
//!
//! | From | Action | To | Parties |
//! |------|--------|----|---------|
//! | PENDING | CONFIRM_PAYMENT | PAID | buyer |
//! | PENDING | CANCEL | CANCELLED | buyer, seller, admin |
//! | PAID | SHIP | SHIPPED | seller |
//! | PAID | SEND_TO_EXPERT | SHIPPED_TO_EXPERT | seller |
//! | PAID | CANCEL | CANCELLED | seller, admin |
//! | SHIPPED | CONFIRM_DELIVERY | DELIVERED | buyer |
//! | SHIPPED, DELIVERED | OPEN_DISPUTE | DISPUTED | buyer |
//! | DELIVERED | COMPLETE | COMPLETED | buyer, admin |
//! | SHIPPED_TO_EXPERT | BEGIN_AUTHENTICATION | PENDING_AUTHENTICATION | admin |
//! | PENDING_AUTHENTICATION | PASS/FAIL_AUTHENTICATION | AUTHENTICATION_PASSED/FAILED | admin |
//! | AUTHENTICATION_PASSED | ISSUE_NFT | NFT_ISSUED | admin |
//! | AUTHENTICATION_FAILED | CANCEL | CANCELLED | admin |
//! | NFT_ISSUED | SHIP | SHIPPED | seller, admin |
//! | DISPUTED | RESOLVE_FOR_BUYER/SELLER | RESOLVED_BUYER/SELLER | admin |

use thiserror::Error;

use super::status::{OrderAction, OrderStatus, Party};
use crate::error::{AppError, ErrorCode};
use crate::models::{Order, OrderActionRequest, StatusChange};

use super::status::OrderAction as A;
use super::status::OrderStatus as S;
use super::status::Party::{Admin, Buyer, Seller};

/// One row of the transition table
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: OrderStatus,
    pub action: OrderAction,
    pub to: OrderStatus,
    pub parties: &'static [Party],
}

const fn row(
    from: OrderStatus,
    action: OrderAction,
    to: OrderStatus,
    parties: &'static [Party],
) -> Transition {
    Transition {
        from,
        action,
        to,
        parties,
    }
}

pub const TRANSITIONS: &[Transition] = &[
    row(S::Pending, A::ConfirmPayment, S::Paid, &[Buyer]),
    row(S::Pending, A::Cancel, S::Cancelled, &[Buyer, Seller, Admin]),
    row(S::Paid, A::Ship, S::Shipped, &[Seller]),
    row(S::Paid, A::SendToExpert, S::ShippedToExpert, &[Seller]),
    row(S::Paid, A::Cancel, S::Cancelled, &[Seller, Admin]),
    row(S::Shipped, A::ConfirmDelivery, S::Delivered, &[Buyer]),
    row(S::Shipped, A::OpenDispute, S::Disputed, &[Buyer]),
    row(S::Delivered, A::OpenDispute, S::Disputed, &[Buyer]),
    row(S::Delivered, A::Complete, S::Completed, &[Buyer, Admin]),
    row(S::ShippedToExpert, A::BeginAuthentication, S::PendingAuthentication, &[Admin]),
    row(S::PendingAuthentication, A::PassAuthentication, S::AuthenticationPassed, &[Admin]),
    row(S::PendingAuthentication, A::FailAuthentication, S::AuthenticationFailed, &[Admin]),
    row(S::AuthenticationPassed, A::IssueNft, S::NftIssued, &[Admin]),
    row(S::AuthenticationFailed, A::Cancel, S::Cancelled, &[Admin]),
    row(S::NftIssued, A::Ship, S::Shipped, &[Seller, Admin]),
    row(S::Disputed, A::ResolveForBuyer, S::ResolvedBuyer, &[Admin]),
    row(S::Disputed, A::ResolveForSeller, S::ResolvedSeller, &[Admin]),
];

/// Rejected transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("order is already {0}")]
    Closed(OrderStatus),

    #[error("cannot {action} an order in status {from}")]
    NotAllowed {
        from: OrderStatus,
        action: OrderAction,
    },

    #[error("{action} is not permitted for this user")]
    Forbidden { action: OrderAction },

    #[error("tracking number is required to ship")]
    TrackingRequired,

    #[error("NFT token id is required")]
    NftTokenRequired,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        let message = err.to_string();
        match err {
            TransitionError::Closed(status) => {
                AppError::with_message(ErrorCode::OrderAlreadyClosed, message)
                    .with_detail("status", status.as_str())
            }
            TransitionError::NotAllowed { from, action } => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, message)
                    .with_detail("status", from.as_str())
                    .with_detail("action", action.to_string())
                    .with_detail(
                        "allowed",
                        allowed_actions(from)
                            .iter()
                            .map(|a| a.to_string())
                            .collect::<Vec<_>>(),
                    )
            }
            TransitionError::Forbidden { .. } => {
                AppError::with_message(ErrorCode::PermissionDenied, message)
            }
            TransitionError::TrackingRequired => AppError::new(ErrorCode::OrderTrackingRequired),
            TransitionError::NftTokenRequired => AppError::new(ErrorCode::OrderNftTokenRequired),
        }
    }
}

fn lookup(from: OrderStatus, action: OrderAction) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.action == action)
}

/// Target status of `action` from `from`, ignoring who asks
pub fn next_status(from: OrderStatus, action: OrderAction) -> Option<OrderStatus> {
    lookup(from, action).map(|t| t.to)
}

/// Actions the table accepts from `from`
pub fn allowed_actions(from: OrderStatus) -> Vec<OrderAction> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == from)
        .map(|t| t.action)
        .collect()
}

/// Actions available to a user holding any of `parties`
pub fn allowed_actions_for(from: OrderStatus, parties: &[Party]) -> Vec<OrderAction> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == from && t.parties.iter().any(|p| parties.contains(p)))
        .map(|t| t.action)
        .collect()
}

/// How a user relates to an order
///
/// A user can hold several parties at once (an admin who is also the buyer).
/// An empty result means the user has no business with the order.
pub fn parties_of(order: &Order, user_id: i64, is_admin: bool) -> Vec<Party> {
    let mut parties = Vec::with_capacity(3);
    if order.buyer_id == user_id {
        parties.push(Party::Buyer);
    }
    if order.seller_id == user_id {
        parties.push(Party::Seller);
    }
    if is_admin {
        parties.push(Party::Admin);
    }
    parties
}

/// Validate `action` from `from` for a user holding `parties`
pub fn transition(
    from: OrderStatus,
    action: OrderAction,
    parties: &[Party],
) -> Result<OrderStatus, TransitionError> {
    if from.is_terminal() {
        return Err(TransitionError::Closed(from));
    }
    let t = lookup(from, action).ok_or(TransitionError::NotAllowed { from, action })?;
    if !t.parties.iter().any(|p| parties.contains(p)) {
        return Err(TransitionError::Forbidden { action });
    }
    Ok(t.to)
}

/// Apply a lifecycle request to an order in place
///
/// Validates the table and the action's payload, updates status and the
/// per-action fields, and appends a [`StatusChange`] to the history.
pub fn apply(
    order: &mut Order,
    request: &OrderActionRequest,
    actor_id: i64,
    parties: &[Party],
    now: i64,
) -> Result<StatusChange, TransitionError> {
    let from = order.status;
    let to = transition(from, request.action, parties)?;

    match request.action {
        OrderAction::Ship => {
            let tracking = non_blank(request.tracking_number.as_deref())
                .ok_or(TransitionError::TrackingRequired)?;
            order.tracking_number = Some(tracking.to_string());
        }
        OrderAction::IssueNft => {
            let token = non_blank(request.nft_token_id.as_deref())
                .ok_or(TransitionError::NftTokenRequired)?;
            order.nft_token_id = Some(token.to_string());
        }
        OrderAction::PassAuthentication | OrderAction::FailAuthentication => {
            if let Some(report) = non_blank(request.report.as_deref()) {
                order.authentication_report = Some(report.to_string());
            }
        }
        _ => {}
    }

    let change = StatusChange {
        from,
        to,
        action: request.action,
        actor_id,
        at: now,
    };
    order.status = to;
    order.updated_at = now;
    order.history.push(change.clone());
    Ok(change)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMode;
    use std::collections::HashSet;

    const EVERYONE: &[Party] = &[Buyer, Seller, Admin];

    fn order(status: OrderStatus) -> Order {
        Order {
            id: 1,
            product_id: 10,
            buyer_id: 100,
            seller_id: 200,
            quantity: 1,
            total: 50.0,
            currency: "USDT".into(),
            payment_mode: PaymentMode::Escrow,
            status,
            tracking_number: None,
            authentication_report: None,
            nft_token_id: None,
            dispute_id: None,
            history: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn run(order: &mut Order, action: OrderAction, party: Party) -> Result<StatusChange, TransitionError> {
        let mut req = OrderActionRequest::new(action);
        req.tracking_number = Some("TRACK-1".into());
        req.nft_token_id = Some("0xabc".into());
        apply(order, &req, 1, &[party], 1000)
    }

    #[test]
    fn table_has_no_duplicate_keys() {
        let mut seen = HashSet::new();
        for t in TRANSITIONS {
            assert!(seen.insert((t.from, t.action)), "duplicate row {:?}", t);
            assert!(!t.from.is_terminal());
            assert!(!t.parties.is_empty());
        }
    }

    #[test]
    fn pairs_outside_table_are_rejected() {
        for from in OrderStatus::ALL {
            for action in OrderAction::ALL {
                let result = transition(from, action, EVERYONE);
                match next_status(from, action) {
                    Some(to) if !from.is_terminal() => assert_eq!(result, Ok(to)),
                    _ => assert!(result.is_err(), "{from} + {action} should fail"),
                }
            }
        }
    }

    #[test]
    fn terminal_statuses_accept_nothing() {
        for from in OrderStatus::ALL.into_iter().filter(OrderStatus::is_terminal) {
            assert!(allowed_actions(from).is_empty());
            assert_eq!(
                transition(from, OrderAction::Cancel, EVERYONE),
                Err(TransitionError::Closed(from))
            );
        }
    }

    #[test]
    fn happy_path_escrow() {
        let mut o = order(OrderStatus::Pending);
        run(&mut o, OrderAction::ConfirmPayment, Buyer).unwrap();
        run(&mut o, OrderAction::Ship, Seller).unwrap();
        run(&mut o, OrderAction::ConfirmDelivery, Buyer).unwrap();
        run(&mut o, OrderAction::Complete, Buyer).unwrap();

        assert_eq!(o.status, OrderStatus::Completed);
        assert_eq!(o.tracking_number.as_deref(), Some("TRACK-1"));
        let path: Vec<_> = o.history.iter().map(|c| c.to).collect();
        assert_eq!(
            path,
            vec![
                OrderStatus::Paid,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
                OrderStatus::Completed
            ]
        );
    }

    #[test]
    fn authentication_path() {
        let mut o = order(OrderStatus::Paid);
        run(&mut o, OrderAction::SendToExpert, Seller).unwrap();
        run(&mut o, OrderAction::BeginAuthentication, Admin).unwrap();

        let mut pass = OrderActionRequest::new(OrderAction::PassAuthentication);
        pass.report = Some("  Genuine, serial matches  ".into());
        apply(&mut o, &pass, 9, &[Admin], 2000).unwrap();
        assert_eq!(o.authentication_report.as_deref(), Some("Genuine, serial matches"));

        run(&mut o, OrderAction::IssueNft, Admin).unwrap();
        assert_eq!(o.nft_token_id.as_deref(), Some("0xabc"));
        run(&mut o, OrderAction::Ship, Seller).unwrap();
        run(&mut o, OrderAction::ConfirmDelivery, Buyer).unwrap();
        assert_eq!(o.status, OrderStatus::Delivered);
        assert_eq!(o.history.len(), 6);
    }

    #[test]
    fn dispute_from_shipped_and_delivered() {
        for start in [OrderStatus::Shipped, OrderStatus::Delivered] {
            let mut o = order(start);
            run(&mut o, OrderAction::OpenDispute, Buyer).unwrap();
            assert_eq!(o.status, OrderStatus::Disputed);
            run(&mut o, OrderAction::ResolveForSeller, Admin).unwrap();
            assert_eq!(o.status, OrderStatus::ResolvedSeller);
        }
    }

    #[test]
    fn wrong_party_is_forbidden() {
        let mut o = order(OrderStatus::Paid);
        let err = run(&mut o, OrderAction::Ship, Buyer).unwrap_err();
        assert_eq!(err, TransitionError::Forbidden { action: OrderAction::Ship });
        assert_eq!(o.status, OrderStatus::Paid);
        assert!(o.history.is_empty());
    }

    #[test]
    fn ship_requires_tracking_number() {
        let mut o = order(OrderStatus::Paid);
        let mut req = OrderActionRequest::new(OrderAction::Ship);
        req.tracking_number = Some("   ".into());
        let err = apply(&mut o, &req, 200, &[Seller], 1).unwrap_err();
        assert_eq!(err, TransitionError::TrackingRequired);
        assert_eq!(o.status, OrderStatus::Paid);
    }

    #[test]
    fn out_of_order_action_reports_allowed_actions() {
        let err = transition(OrderStatus::Pending, OrderAction::Ship, &[Seller]).unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::OrderInvalidTransition);
        let allowed = app.details.unwrap().remove("allowed").unwrap();
        assert_eq!(allowed, serde_json::json!(["CONFIRM_PAYMENT", "CANCEL"]));
    }

    #[test]
    fn allowed_actions_per_party() {
        assert_eq!(
            allowed_actions_for(OrderStatus::Paid, &[Seller]),
            vec![OrderAction::Ship, OrderAction::SendToExpert, OrderAction::Cancel]
        );
        assert_eq!(
            allowed_actions_for(OrderStatus::Paid, &[Buyer]),
            Vec::<OrderAction>::new()
        );
    }

    #[test]
    fn parties_follow_order_roles() {
        let o = order(OrderStatus::Paid);
        assert_eq!(parties_of(&o, 100, false), vec![Buyer]);
        assert_eq!(parties_of(&o, 200, true), vec![Seller, Admin]);
        assert!(parties_of(&o, 300, false).is_empty());
    }
}
