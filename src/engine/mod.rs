//! Core engine — validation gate and the owned slip session.

pub mod gate;
pub mod session;
