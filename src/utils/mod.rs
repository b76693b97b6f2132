pub mod calc;
pub mod coin_select;
pub mod token;
