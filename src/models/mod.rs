//! Database models
//!
//! Row structs with associated query functions; every function takes the
//! shared [`sqlx::PgPool`] explicitly. Items, customer details and cart
//! contents are stored as JSONB documents.

pub mod cart;
pub mod content;
pub mod order;
pub mod product;
pub mod quotation;
pub mod user;
pub mod visitor;

pub use cart::Cart;
pub use content::{ContentItem, ContentKind};
pub use order::{Order, OrderStatus};
pub use product::{Product, Service};
pub use quotation::Quotation;
pub use user::{User, UserRole};
