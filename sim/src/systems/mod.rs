pub mod clock;
pub mod detection;
pub mod guards;
pub mod players;
