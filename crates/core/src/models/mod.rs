//! Domain entities and the request payloads that create or change them.

pub mod about;
pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod ticket;
pub mod user;

pub use about::{About, AboutContent, AboutValue, UpdateAboutRequest};
pub use category::{
    Category, CategoryPatch, CreateCategoryRequest, NewCategory, UpdateCategoryRequest,
};
pub use order::{
    CreateOrderRequest, NewOrder, Order, OrderItem, OrderStatusUpdate, ShippingAddress,
    UpdateOrderStatusRequest,
};
pub use product::{
    ColorStock, CreateProductRequest, NewProduct, Product, ProductPatch, UpdateProductRequest,
};
pub use review::{CreateReviewRequest, NewReview, Review};
pub use ticket::{CreateTicketRequest, NewTicket, Ticket, UpdateTicketRequest};
pub use user::{Credentials, LoginRequest, NewUser, SignupRequest, User, UserProfile};
