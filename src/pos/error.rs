use thiserror::Error;

use crate::api::ApiError;

/// Caller-side validation failures, raised before any mutation is sent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
  #[error("Purchase order not found")]
  PurchaseOrderNotFound,

  #[error("Goods receiving record not found")]
  ReceivingNotFound,

  #[error("Received date cannot be before order date")]
  ReceivedBeforeOrder,

  #[error("Received quantity ({received}) exceeds remaining quantity ({remaining})")]
  ExceedsRemaining { received: u32, remaining: i64 },

  #[error("Received quantity must be greater than 0")]
  NonPositiveQuantity,

  #[error("Both 'menu_item' and 'quantity' fields are required.")]
  MissingOrderItemFields,
}

/// Failure of a multi-step service flow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
  #[error(transparent)]
  Api(#[from] ApiError),

  #[error(transparent)]
  Validation(#[from] ValidationError),
}
