//! 订单状态变更与支付的纯函数
//!
//! 这里只修改单个 [`Order`]；库存归还等跨实体副作用由 manager 处理。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::money;
use shared::order::{Order, OrderPatch, OrderStatus, PaymentMethod, PaymentStatus};
use shared::util::non_blank;

/// Terminal orders refuse every edit
pub fn ensure_mutable(order: &Order) -> AppResult<()> {
    match order.status {
        OrderStatus::PickedUp => Err(AppError::with_message(
            ErrorCode::OrderAlreadyCompleted,
            format!("Order {} was already picked up", order.order_number),
        )),
        OrderStatus::Cancelled => Err(AppError::with_message(
            ErrorCode::OrderAlreadyCancelled,
            format!("Order {} was cancelled", order.order_number),
        )),
        _ => Ok(()),
    }
}

/// Move `order` to `target`, stamping the matching timestamp
///
/// `reason` is required (non-blank) when cancelling.
pub fn apply_status(
    order: &mut Order,
    target: OrderStatus,
    reason: Option<String>,
    now: i64,
) -> AppResult<()> {
    order.status.check_transition(target)?;

    match target {
        OrderStatus::Accepted => {}
        OrderStatus::Cooking => order.cooking_started_at = Some(now),
        OrderStatus::Ready => order.ready_at = Some(now),
        OrderStatus::PickedUp => order.picked_up_at = Some(now),
        OrderStatus::Cancelled => {
            let reason =
                non_blank(reason).ok_or_else(|| AppError::new(ErrorCode::CancellationReasonRequired))?;
            order.cancellation_reason = Some(reason);
            order.cancelled_at = Some(now);
        }
    }

    order.status = target;
    order.updated_at = now;
    Ok(())
}

/// Mark `order` paid
pub fn apply_payment(
    order: &mut Order,
    method: PaymentMethod,
    amount: f64,
    now: i64,
) -> AppResult<()> {
    ensure_mutable(order)?;
    if order.is_paid() {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyPaid,
            format!("Order {} is already paid", order.order_number),
        ));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Payment amount must be a non-negative number",
        )
        .with_detail("amount", amount));
    }
    if !money::covers(amount, order.total_amount) {
        return Err(AppError::with_message(
            ErrorCode::PaymentInsufficientAmount,
            format!(
                "Payment {} is less than the order total {}",
                amount, order.total_amount
            ),
        )
        .with_detail("amount", amount)
        .with_detail("total_amount", order.total_amount));
    }

    order.payment_status = PaymentStatus::Paid;
    order.payment_method = Some(method);
    order.paid_amount = amount;
    order.paid_at = Some(now);
    order.updated_at = now;
    Ok(())
}

/// Apply a partial update; a status change goes through [`apply_status`]
pub fn apply_patch(order: &mut Order, patch: OrderPatch, now: i64) -> AppResult<()> {
    ensure_mutable(order)?;

    if patch.cancellation_reason.is_some() && patch.status != Some(OrderStatus::Cancelled) {
        return Err(AppError::validation(
            "cancellation_reason is only accepted together with status cancelled",
        ));
    }
    if let Some(pickup_at) = patch.estimated_pickup_at
        && pickup_at < order.created_at
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "estimated_pickup_at is before the order was created",
        )
        .with_detail("estimated_pickup_at", pickup_at));
    }

    // Validate the transition before touching any field
    if let Some(target) = patch.status {
        order.status.check_transition(target)?;
    }

    if let Some(method) = patch.payment_method {
        order.payment_method = Some(method);
    }
    if patch.special_instructions.is_some() {
        order.special_instructions = non_blank(patch.special_instructions);
    }
    if let Some(pickup_at) = patch.estimated_pickup_at {
        order.estimated_pickup_at = pickup_at;
    }
    order.updated_at = now;

    if let Some(target) = patch.status {
        apply_status(order, target, patch.cancellation_reason, now)?;
    }
    Ok(())
}
