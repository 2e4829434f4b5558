pub mod catalog;
pub mod customer;
pub mod follow_up;
pub mod interaction;
pub mod recommendation;
