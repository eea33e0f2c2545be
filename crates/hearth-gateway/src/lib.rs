//! Clients for the services Hearth reaches over HTTP.
//!
//! - [`PaymentGateway`]: gateway orders and payment/webhook signature checks,
//!   implemented by [`RazorpayClient`]
//! - [`ImageHost`]: signed uploads and deletes, implemented by
//!   [`CloudinaryClient`]
//!
//! The server holds both behind `Arc<dyn ...>` so tests can swap in fakes.

mod cloudinary;
mod error;
mod image;
mod payment;
mod razorpay;
pub mod signature;

pub use cloudinary::{sign_params, CloudinaryClient, CloudinaryConfig};
pub use error::GatewayError;
pub use image::{ImageHost, UploadFile, UploadedImage, ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES};
pub use payment::{CreateGatewayOrder, GatewayOrder, PaymentGateway, WebhookEvent, SETTLING_EVENTS};
pub use razorpay::{RazorpayClient, RazorpayConfig};
