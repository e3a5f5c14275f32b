pub mod decide_purchase_order_command;

pub use decide_purchase_order_command::{
    DecidePurchaseOrderCommand, DecidePurchaseOrderResult,
};
