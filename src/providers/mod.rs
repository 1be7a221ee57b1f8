pub mod birdeye;

pub use birdeye::BirdeyeProvider;
