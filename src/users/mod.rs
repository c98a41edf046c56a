pub mod store;

pub use store::{SqlUserStore, User, UserStore};
