// Adapters layer: concrete implementations of the domain ports (processes, terminal, http).

pub mod http;
pub mod process;
pub mod prompt;
