pub mod date;
pub mod membership;
pub mod numeric;
pub mod text;
