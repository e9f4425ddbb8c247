//! Domain layer: value objects, entities and the store/gateway ports.

pub mod catalog;
pub mod ids;
pub mod money;
pub mod notification;
pub mod offer;
pub mod order;
pub mod payment;
pub mod ports;
