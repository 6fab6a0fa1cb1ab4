pub mod products;
pub mod suppliers;
pub mod users;

pub use products::Entity as Products;
pub use suppliers::{Entity as Suppliers, SupplierType};
pub use users::Entity as Users;
