pub mod extraction;
pub mod price;
pub mod product_query;
pub mod verdict;
