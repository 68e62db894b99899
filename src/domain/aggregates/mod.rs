//! Aggregates module
pub mod card_capture;
pub mod config;
pub mod customer;
pub mod pix_copy;
pub mod product;
pub mod sale;
pub mod testimonial;

pub use card_capture::{CardCapture, CardForm};
pub use config::{CheckoutConfig, StatusPanel, StoredConfig};
pub use customer::{Customer, IdentificationForm};
pub use pix_copy::{PixMessage, PixMessageInput, PixSection, PixSectionInput};
pub use product::{PixCharge, Product, ProductInput, ProductKind};
pub use sale::{Sale, SaleMethod, SaleView};
pub use testimonial::{Testimonial, TestimonialInput};
