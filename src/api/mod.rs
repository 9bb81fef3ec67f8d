mod gas;
mod price;

pub use gas::GasClient;
pub use price::PriceClient;
