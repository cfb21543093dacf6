//! One module per subcommand, each exposing `execute`.

pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod status;
