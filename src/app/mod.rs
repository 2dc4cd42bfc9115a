pub mod forward_use_case;
pub mod ports;

pub use forward_use_case::ForwardUseCase;
