pub mod products;
pub mod health;

pub use products::{
    all_products, product_by_id, products_by_category, products_by_category_and_price,
    products_by_price, search_products,
};
pub use health::health_check;
