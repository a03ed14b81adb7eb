pub mod decode;
pub mod lookup;
pub mod mapper;

pub use lookup::load_persisted;
pub use mapper::LookupError;
